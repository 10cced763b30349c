use async_trait::async_trait;
use cascade_dns_domain::{DomainError, UpstreamTimeouts};
use hickory_proto::op::Message;

/// Client side of a DNS exchange with the configured upstream resolver.
#[async_trait]
pub trait UpstreamExchanger: Send + Sync {
    /// Sends `request` as-is and returns the decoded reply. Each phase of the
    /// exchange is bounded by the matching entry of `timeouts`.
    async fn exchange(
        &self,
        request: &Message,
        timeouts: &UpstreamTimeouts,
    ) -> Result<Message, DomainError>;

    /// Human-readable upstream identity for logs.
    fn upstream_name(&self) -> String;
}
