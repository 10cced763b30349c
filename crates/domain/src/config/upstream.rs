use crate::dns_protocol::UpstreamEndpoint;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// `HOST:PORT` (UDP), `udp://HOST:PORT` or `tcp://HOST:PORT`.
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_timeout_ms")]
    pub dial_timeout_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub write_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            dial_timeout_ms: default_timeout_ms(),
            read_timeout_ms: default_timeout_ms(),
            write_timeout_ms: default_timeout_ms(),
        }
    }
}

impl UpstreamConfig {
    pub fn endpoint(&self) -> Result<UpstreamEndpoint, String> {
        self.address.parse()
    }

    pub fn timeouts(&self) -> UpstreamTimeouts {
        UpstreamTimeouts {
            dial: Duration::from_millis(self.dial_timeout_ms),
            read: Duration::from_millis(self.read_timeout_ms),
            write: Duration::from_millis(self.write_timeout_ms),
        }
    }
}

/// Per-operation bounds for a single upstream exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub dial: Duration,
    pub read: Duration,
    pub write: Duration,
}

impl UpstreamTimeouts {
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            dial: timeout,
            read: timeout,
            write: timeout,
        }
    }

    /// Upper bound on a whole exchange, dial plus write plus read.
    pub fn total(&self) -> Duration {
        self.dial + self.write + self.read
    }
}

impl Default for UpstreamTimeouts {
    fn default() -> Self {
        Self::uniform(Duration::from_millis(default_timeout_ms()))
    }
}

fn default_address() -> String {
    "8.8.8.8:53".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}
