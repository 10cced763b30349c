use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// TTL stamped on answers served from static records.
    #[serde(default = "default_static_answer_ttl")]
    pub static_answer_ttl: u32,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            static_answer_ttl: default_static_answer_ttl(),
        }
    }
}

fn default_static_answer_ttl() -> u32 {
    60
}
