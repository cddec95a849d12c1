//! Run Summary Output
//!
//! Pretty-printed JSON files written once a run ends.

use naming_events::{ModelSnapshot, RunSummary};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::OutputError;

/// Summary file name inside the output directory
pub const SUMMARY_FILE: &str = "summary.json";
/// Final state file name inside the output directory
pub const SNAPSHOT_FILE: &str = "final_state.json";

pub fn write_summary(dir: impl AsRef<Path>, summary: &RunSummary) -> Result<PathBuf, OutputError> {
    write_pretty(dir.as_ref(), SUMMARY_FILE, summary)
}

pub fn write_snapshot(
    dir: impl AsRef<Path>,
    snapshot: &ModelSnapshot,
) -> Result<PathBuf, OutputError> {
    write_pretty(dir.as_ref(), SNAPSHOT_FILE, snapshot)
}

fn write_pretty<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf, OutputError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use naming_events::{Metrics, ModelVariant, VocabularyMetrics};

    #[test]
    fn test_summary_written_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("runs/seed-1");
        let summary = RunSummary {
            variant: ModelVariant::Minimal,
            seed: 1,
            population: 4,
            steps: 10,
            consensus_step: None,
            final_metrics: Metrics::Vocabulary(VocabularyMetrics::default()),
            elapsed_ms: 3,
        };

        let path = write_summary(&nested, &summary).unwrap();
        assert_eq!(path, nested.join(SUMMARY_FILE));
        let parsed: RunSummary = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, summary);
    }
}
