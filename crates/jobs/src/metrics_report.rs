use cascade_dns_application::services::{PipelineMetrics, PipelineMetricsSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60);

/// Logs pipeline counters on a fixed interval.
pub struct MetricsReportJob {
    metrics: Arc<PipelineMetrics>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl MetricsReportJob {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            metrics,
            interval: DEFAULT_REPORT_INTERVAL,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting metrics report job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("MetricsReportJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        log_snapshot("Pipeline metrics", &self.metrics.snapshot());
                    }
                }
            }
        });
    }
}

pub fn log_snapshot(message: &str, snapshot: &PipelineMetricsSnapshot) {
    info!(
        queries = snapshot.queries,
        static_hits = snapshot.static_hits,
        cache_hits = snapshot.cache_hits,
        cache_misses = snapshot.cache_misses,
        cache_errors = snapshot.cache_errors,
        cache_hit_rate = snapshot.cache_hit_rate(),
        upstream_answers = snapshot.upstream_answers,
        upstream_failures = snapshot.upstream_failures,
        malformed = snapshot.malformed,
        "{}",
        message
    );
}
