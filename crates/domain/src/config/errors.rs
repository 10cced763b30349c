#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to write config file {0}: {1}")]
    FileWrite(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid upstream '{address}': {reason}")]
    InvalidUpstream { address: String, reason: String },

    #[error("Invalid static record '{name}': {reason}")]
    InvalidStaticRecord { name: String, reason: String },

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
