use serde::{Deserialize, Serialize};

use super::cache::{CacheBackend, CacheConfig};
use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::static_records::StaticRecordConfig;
use super::upstream::UpstreamConfig;

const LOCAL_CONFIG_PATH: &str = "cascade-dns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/cascade-dns/config.toml";

/// Main configuration structure for Cascade DNS
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (port, bind address)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream resolver used on a local miss
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Shared answer cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Static-tier answer policy
    #[serde(default)]
    pub dns: DnsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Authoritative records served before the cache and upstream
    #[serde(default)]
    pub static_records: Vec<StaticRecordConfig>,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. cascade-dns.toml in current directory
    /// 3. /etc/cascade-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(upstream) = overrides.upstream {
            self.upstream.address = upstream;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        self.upstream
            .endpoint()
            .map_err(|reason| ConfigError::InvalidUpstream {
                address: self.upstream.address.clone(),
                reason,
            })?;

        if self.upstream.dial_timeout_ms == 0
            || self.upstream.read_timeout_ms == 0
            || self.upstream.write_timeout_ms == 0
        {
            return Err(ConfigError::Validation(
                "Upstream timeouts must be greater than 0".to_string(),
            ));
        }

        if self.cache.enabled {
            if self.cache.entry_ttl_secs == 0 {
                return Err(ConfigError::Validation(
                    "Cache entry TTL must be greater than 0".to_string(),
                ));
            }
            if self.cache.operation_timeout_ms == 0 {
                return Err(ConfigError::Validation(
                    "Cache operation timeout must be greater than 0".to_string(),
                ));
            }
            if self.cache.sweep_interval_secs == 0 {
                return Err(ConfigError::Validation(
                    "Cache sweep interval must be greater than 0".to_string(),
                ));
            }
            if self.cache.max_entries == 0 {
                return Err(ConfigError::Validation(
                    "Cache max_entries must be greater than 0".to_string(),
                ));
            }
            if self.cache.backend == CacheBackend::Redis
                && self.cache.redis_address.trim().is_empty()
            {
                return Err(ConfigError::Validation(
                    "Cache backend 'redis' needs a redis_address".to_string(),
                ));
            }
        }

        for record in &self.static_records {
            if record.name.trim().trim_end_matches('.').is_empty() {
                return Err(ConfigError::InvalidStaticRecord {
                    name: record.name.clone(),
                    reason: "empty name".to_string(),
                });
            }
            record
                .parsed_type()
                .map_err(|e| ConfigError::InvalidStaticRecord {
                    name: record.name.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub upstream: Option<String>,
    pub log_level: Option<String>,
}
