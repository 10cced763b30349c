//! Cascade DNS Domain Layer
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod errors;
pub mod record_type;
pub mod static_records;

pub use config::{CliOverrides, Config, ConfigError, UpstreamTimeouts};
pub use dns_protocol::{UpstreamAddr, UpstreamEndpoint};
pub use dns_query::DnsQuery;
pub use errors::DomainError;
pub use record_type::RecordType;
pub use static_records::{StaticRecordStore, StaticRecordStoreBuilder};
