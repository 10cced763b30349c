use cascade_dns_domain::config::LogFormat;
use cascade_dns_domain::Config;
use tracing::{info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` directives take precedence over the configured level.
pub fn init_logging(config: &Config) {
    let level = config
        .logging
        .level
        .parse::<Level>()
        .unwrap_or(Level::INFO);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true);

    match config.logging.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.with_ansi(true).init(),
    }

    info!("Logging initialized at level: {}", level);
}
