pub mod cache_value;
pub mod pipeline_metrics;
pub mod record_matcher;
pub mod record_text;

pub use pipeline_metrics::{PipelineMetrics, PipelineMetricsSnapshot};
pub use record_matcher::{MatchOutcome, RecordMatcher};
pub use record_text::{parse_record, render_record};
