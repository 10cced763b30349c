use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Cache operation timed out")]
    CacheTimeout,

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Transport connection reset by {server}")]
    TransportConnectionReset { server: String },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// True for failures of the network path to a server, as opposed to
    /// failures in the content that came back.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::QueryTimeout
                | DomainError::TransportTimeout { .. }
                | DomainError::TransportConnectionRefused { .. }
                | DomainError::TransportConnectionReset { .. }
                | DomainError::TransportError(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            DomainError::QueryTimeout
                | DomainError::CacheTimeout
                | DomainError::TransportTimeout { .. }
        )
    }
}
