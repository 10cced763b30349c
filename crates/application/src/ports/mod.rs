mod cache_maintenance_port;
mod cache_store;
mod upstream_exchanger;

pub use cache_maintenance_port::{CacheMaintenancePort, CacheSweepOutcome};
pub use cache_store::CacheStore;
pub use upstream_exchanger::UpstreamExchanger;

// Re-export for convenience
pub use cascade_dns_domain::{DnsQuery, UpstreamTimeouts};
