use cascade_dns_domain::CliOverrides;
use cascade_dns_jobs::{log_snapshot, CacheSweepJob, JobRunner, MetricsReportJob};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod bootstrap;
mod di;
mod server;

const METRICS_REPORT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "cascade-dns")]
#[command(version)]
#[command(about = "Cascade DNS - Static records, answer cache and upstream forwarding")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream resolver (host:port, udp://host:port or tcp://host:port)
    #[arg(short = 'u', long)]
    upstream: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        upstream: cli.upstream.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Cascade DNS v{}", env!("CARGO_PKG_VERSION"));
    bootstrap::log_config_summary(&config, cli.config.as_deref());

    let dns_services = di::DnsServices::new(&config).await?;

    let shutdown_token = CancellationToken::new();
    let mut runner = JobRunner::new()
        .with_metrics_report(
            MetricsReportJob::new(dns_services.metrics.clone())
                .with_interval(METRICS_REPORT_INTERVAL),
        )
        .with_shutdown_token(shutdown_token.clone());

    if let Some(maintenance) = dns_services.cache_maintenance.clone() {
        runner = runner.with_cache_sweep(
            CacheSweepJob::new(maintenance).with_interval(config.cache.sweep_interval()),
        );
    }
    runner.start().await;

    let dns_addr: SocketAddr = config.server.listen_address().parse().map_err(|e| {
        anyhow::anyhow!(
            "Invalid listen address {}: {}",
            config.server.listen_address(),
            e
        )
    })?;
    let tcp_idle_timeout = Duration::from_secs(config.server.tcp_idle_timeout_secs);

    tokio::select! {
        result = server::start_dns_server(dns_addr, dns_services.handler.clone(), tcp_idle_timeout) => {
            if let Err(e) = result {
                error!(error = %e, "DNS server error");
                shutdown_token.cancel();
                return Err(e);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        }
    }

    shutdown_token.cancel();
    log_snapshot("Final pipeline metrics", &dns_services.metrics.snapshot());

    info!("Server shutdown complete");
    Ok(())
}
