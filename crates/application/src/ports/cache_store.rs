use async_trait::async_trait;
use cascade_dns_domain::DomainError;
use std::time::Duration;

/// Shared key/value store with per-entry expiry.
///
/// `get` distinguishes a miss (`Ok(None)`) from a failure (`Err`). The store
/// may be shared with other processes: callers never assume exclusive access.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;
}
