//! Metric Sinks
//!
//! Destinations for the per-step metric series: an in-memory history for
//! analysis and a JSONL file writer.

use naming_events::{Metrics, MetricsRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::OutputError;

/// Receives one record per completed step
pub trait MetricsSink {
    fn record(&mut self, record: &MetricsRecord) -> Result<(), OutputError>;

    fn flush(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// In-memory metric time series
#[derive(Debug, Clone, Default)]
pub struct MetricsHistory {
    records: Vec<MetricsRecord>,
}

impl MetricsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MetricsRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[MetricsRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&Metrics> {
        self.records.last().map(|r| &r.metrics)
    }

    /// One named metric across all recorded steps
    pub fn series(&self, name: &str) -> Vec<(u64, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.metrics.get(name).map(|value| (r.step, value)))
            .collect()
    }
}

impl MetricsSink for MetricsHistory {
    fn record(&mut self, record: &MetricsRecord) -> Result<(), OutputError> {
        self.push(*record);
        Ok(())
    }
}

/// Streams metric records to a JSONL file
pub struct JsonlMetricsWriter {
    writer: BufWriter<File>,
}

impl JsonlMetricsWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl MetricsSink for JsonlMetricsWriter {
    fn record(&mut self, record: &MetricsRecord) -> Result<(), OutputError> {
        writeln!(self.writer, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}
