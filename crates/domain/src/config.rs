pub mod cache;
pub mod dns;
pub mod errors;
pub mod logging;
pub mod root;
pub mod server;
pub mod static_records;
pub mod upstream;

pub use cache::{CacheBackend, CacheConfig};
pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use static_records::StaticRecordConfig;
pub use upstream::{UpstreamConfig, UpstreamTimeouts};
