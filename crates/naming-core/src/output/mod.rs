//! Output Module
//!
//! Metric sinks, the interaction event log and run summary files.

pub mod logger;
pub mod metrics;
pub mod summary;

pub use logger::EventLogger;
pub use metrics::{JsonlMetricsWriter, MetricsHistory, MetricsSink};
pub use summary::{write_snapshot, write_summary, SNAPSHOT_FILE, SUMMARY_FILE};

/// Errors raised while writing run output
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
