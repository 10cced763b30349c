pub mod cache_sweep;
pub mod metrics_report;
pub mod runner;

pub use cache_sweep::CacheSweepJob;
pub use metrics_report::{log_snapshot, MetricsReportJob};
pub use runner::JobRunner;
