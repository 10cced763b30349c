use crate::dns::transport::{create_transport, Transport};
use async_trait::async_trait;
use cascade_dns_application::ports::{UpstreamExchanger, UpstreamTimeouts};
use cascade_dns_domain::{DomainError, UpstreamEndpoint};
use hickory_proto::op::Message;
use tracing::debug;

/// Forwards requests to a single upstream resolver.
pub struct UpstreamForwarder {
    endpoint: UpstreamEndpoint,
    transport: Transport,
}

impl UpstreamForwarder {
    /// `endpoint` must carry a resolved socket address.
    pub fn new(endpoint: UpstreamEndpoint) -> Result<Self, DomainError> {
        let transport = create_transport(&endpoint)?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    pub fn endpoint(&self) -> &UpstreamEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl UpstreamExchanger for UpstreamForwarder {
    async fn exchange(
        &self,
        request: &Message,
        timeouts: &UpstreamTimeouts,
    ) -> Result<Message, DomainError> {
        let request_bytes = request.to_vec().map_err(|e| {
            DomainError::MalformedRequest(format!("Failed to serialize request: {}", e))
        })?;

        debug!(
            upstream = %self.endpoint,
            protocol = self.transport.protocol_name(),
            query_id = request.id(),
            "Forwarding query upstream"
        );
        let response = self.transport.send(&request_bytes, timeouts).await?;

        let reply = Message::from_vec(&response.bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!(
                "Undecodable reply from {}: {}",
                self.endpoint, e
            ))
        })?;

        if reply.id() != request.id() {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Reply id {} from {} does not match request id {}",
                reply.id(),
                self.endpoint,
                request.id()
            )));
        }

        debug!(
            upstream = %self.endpoint,
            protocol = response.protocol_used,
            rcode = %reply.response_code(),
            answers = reply.answers().len(),
            truncated = reply.truncated(),
            "Upstream reply received"
        );

        Ok(reply)
    }

    fn upstream_name(&self) -> String {
        self.endpoint.to_string()
    }
}
