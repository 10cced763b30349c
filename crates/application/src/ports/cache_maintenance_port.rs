use async_trait::async_trait;
use cascade_dns_domain::DomainError;

/// Outcome of one expiry sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheSweepOutcome {
    pub entries_removed: usize,
    pub cache_size: usize,
}

/// Housekeeping for cache stores that hold expired entries until removed.
#[async_trait]
pub trait CacheMaintenancePort: Send + Sync {
    async fn run_sweep_cycle(&self) -> Result<CacheSweepOutcome, DomainError>;
}
