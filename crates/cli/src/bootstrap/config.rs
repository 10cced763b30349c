use cascade_dns_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Called once logging is up, so the summary is not lost.
pub fn log_config_summary(config: &Config, config_path: Option<&str>) {
    info!(
        config_file = config_path
            .map(str::to_string)
            .or_else(Config::get_config_path)
            .as_deref()
            .unwrap_or("default"),
        dns_port = config.server.dns_port,
        bind = %config.server.bind_address,
        upstream = %config.upstream.address,
        cache_enabled = config.cache.enabled,
        cache_backend = ?config.cache.backend,
        static_records = config.static_records.len(),
        "Configuration loaded"
    );
}
