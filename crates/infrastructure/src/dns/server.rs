use cascade_dns_application::use_cases::ResolveQueryUseCase;
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Size of the fixed DNS header.
const DNS_HEADER_LEN: usize = 12;

/// Largest UDP reply for a client that does not advertise EDNS.
const DEFAULT_UDP_PAYLOAD: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Udp => "UDP",
            Protocol::Tcp => "TCP",
        }
    }
}

/// Wire-level entry point shared by the UDP and TCP listeners.
pub struct DnsRequestHandler {
    use_case: Arc<ResolveQueryUseCase>,
}

impl DnsRequestHandler {
    pub fn new(use_case: Arc<ResolveQueryUseCase>) -> Self {
        Self { use_case }
    }

    pub fn use_case(&self) -> &Arc<ResolveQueryUseCase> {
        &self.use_case
    }

    /// Decodes one request, resolves it and encodes the reply.
    ///
    /// Returns `None` when nothing should be sent back: input too short to
    /// carry an id, or a message that is itself a response.
    pub async fn handle_raw(
        &self,
        bytes: &[u8],
        client: SocketAddr,
        protocol: Protocol,
    ) -> Option<Vec<u8>> {
        let request = match Message::from_vec(bytes) {
            Ok(request) => request,
            Err(e) => return Self::format_error(bytes, client, &e.to_string()),
        };

        if request.message_type() == MessageType::Response {
            debug!(client = %client, id = request.id(), "Ignoring DNS response sent to server");
            return None;
        }

        if let Some(query) = request.queries().first() {
            info!(
                client = %client,
                protocol = protocol.as_str(),
                domain = %query.name(),
                record_type = %query.query_type(),
                "DNS query received"
            );
        }

        let resolution = self.use_case.execute(&request).await;
        debug!(
            client = %client,
            id = request.id(),
            source = resolution.source.as_str(),
            rcode = %resolution.response.response_code(),
            answers = resolution.response.answers().len(),
            "Sending response"
        );

        let encoded = match resolution.response.to_vec() {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(error = %e, client = %client, "Failed to encode response");
                return Self::server_failure(&request);
            }
        };

        if protocol == Protocol::Udp {
            let limit = udp_payload_limit(&request);
            if encoded.len() > limit {
                debug!(
                    client = %client,
                    size = encoded.len(),
                    limit,
                    "Response exceeds UDP payload, sending truncated reply"
                );
                return Self::truncated(&resolution.response, &request);
            }
        }

        Some(encoded)
    }

    fn format_error(bytes: &[u8], client: SocketAddr, reason: &str) -> Option<Vec<u8>> {
        if bytes.len() < DNS_HEADER_LEN {
            warn!(client = %client, len = bytes.len(), "Dropping runt DNS packet");
            return None;
        }

        warn!(client = %client, error = %reason, "Undecodable DNS request, replying FORMERR");
        let id = u16::from_be_bytes([bytes[0], bytes[1]]);
        Message::error_msg(id, OpCode::Query, ResponseCode::FormErr)
            .to_vec()
            .ok()
    }

    fn server_failure(request: &Message) -> Option<Vec<u8>> {
        let mut reply = Message::error_msg(request.id(), request.op_code(), ResponseCode::ServFail);
        reply.add_queries(request.queries().to_vec());
        reply.set_recursion_desired(request.recursion_desired());
        reply.set_recursion_available(true);
        reply.to_vec().ok()
    }

    fn truncated(response: &Message, request: &Message) -> Option<Vec<u8>> {
        let mut reply = Message::new();
        reply.set_header(*response.header());
        reply.add_queries(request.queries().to_vec());
        reply.set_truncated(true);
        match reply.to_vec() {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                error!(error = %e, "Failed to encode truncated response");
                Self::server_failure(request)
            }
        }
    }
}

/// Payload size the client accepts over UDP, never below 512.
fn udp_payload_limit(request: &Message) -> usize {
    request
        .extensions()
        .as_ref()
        .map(|edns| edns.max_payload() as usize)
        .unwrap_or(DEFAULT_UDP_PAYLOAD)
        .max(DEFAULT_UDP_PAYLOAD)
}
