use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where cache entries are kept.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process map, private to this server.
    #[default]
    Memory,
    /// Redis server, shared by every instance pointed at it.
    Redis,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: CacheBackend,

    /// `host:port` or a `redis://` URL; read only by the redis backend.
    #[serde(default = "default_redis_address")]
    pub redis_address: String,

    /// Lifetime of a cache entry from the moment it is written.
    #[serde(default = "default_entry_ttl_secs")]
    pub entry_ttl_secs: u64,

    /// TTL stamped on answers served from the cache.
    #[serde(default = "default_answer_ttl")]
    pub answer_ttl: u32,

    /// Bound on a single cache get or set.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            backend: CacheBackend::default(),
            redis_address: default_redis_address(),
            entry_ttl_secs: default_entry_ttl_secs(),
            answer_ttl: default_answer_ttl(),
            operation_timeout_ms: default_operation_timeout_ms(),
            max_entries: default_max_entries(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl CacheConfig {
    pub fn entry_ttl(&self) -> Duration {
        Duration::from_secs(self.entry_ttl_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Connection URL for the redis backend.
    pub fn redis_url(&self) -> String {
        let address = self.redis_address.trim();
        if address.contains("://") {
            address.to_string()
        } else {
            format!("redis://{}", address)
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_redis_address() -> String {
    "localhost:6379".to_string()
}

fn default_entry_ttl_secs() -> u64 {
    300
}

fn default_answer_ttl() -> u32 {
    300
}

fn default_operation_timeout_ms() -> u64 {
    1000
}

fn default_max_entries() -> usize {
    100_000
}

fn default_sweep_interval_secs() -> u64 {
    60
}
