//! Snapshot Types
//!
//! Serialization structs for per-step metrics, model snapshots and run
//! summaries.
//!
//! Metric field names follow the labels used by the analysis notebooks
//! (`Minority_Opinion`, `Total_Words`, ...), so recorded series can be loaded
//! without renaming columns.

use serde::{Deserialize, Serialize};

/// Which naming game is being simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Group consensus with committed minority agents
    Advanced,
    /// Two-agent word invention and negotiation
    Minimal,
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelVariant::Advanced => write!(f, "advanced"),
            ModelVariant::Minimal => write!(f, "minimal"),
        }
    }
}

/// Opinion fractions of the advanced model, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpinionMetrics {
    #[serde(rename = "Minority_Opinion")]
    pub minority_opinion: f64,
    #[serde(rename = "General_Opinion")]
    pub general_opinion: f64,
    #[serde(rename = "Mixed_Opinion")]
    pub mixed_opinion: f64,
}

impl OpinionMetrics {
    /// Builds fractions from raw counts over a population of `total` agents.
    pub fn from_counts(minority: usize, general: usize, mixed: usize, total: usize) -> Self {
        if total == 0 {
            return Self::default();
        }
        let total = total as f64;
        Self {
            minority_opinion: minority as f64 / total,
            general_opinion: general as f64 / total,
            mixed_opinion: mixed as f64 / total,
        }
    }

    /// True when no agent is mixed and one of the pure opinions has vanished.
    pub fn only_one_opinion(&self) -> bool {
        self.mixed_opinion == 0.0 && (self.general_opinion == 0.0 || self.minority_opinion == 0.0)
    }
}

/// Vocabulary statistics of the minimal model
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabularyMetrics {
    /// Words held across all inventories, counted with multiplicity
    #[serde(rename = "Total_Words")]
    pub total_words: u64,
    /// Distinct words held by anyone
    #[serde(rename = "Different_Words")]
    pub different_words: u64,
    /// Successful interactions over interactions in the last step
    #[serde(rename = "Prob_Success")]
    pub prob_success: f64,
}

/// Metrics of either variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metrics {
    Opinion(OpinionMetrics),
    Vocabulary(VocabularyMetrics),
}

impl Metrics {
    /// Named numeric values, one per tracked metric.
    pub fn values(&self) -> Vec<(&'static str, f64)> {
        match self {
            Metrics::Opinion(m) => vec![
                ("Minority_Opinion", m.minority_opinion),
                ("General_Opinion", m.general_opinion),
                ("Mixed_Opinion", m.mixed_opinion),
            ],
            Metrics::Vocabulary(m) => vec![
                ("Total_Words", m.total_words as f64),
                ("Different_Words", m.different_words as f64),
                ("Prob_Success", m.prob_success),
            ],
        }
    }

    /// Looks up one metric by its label.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values()
            .into_iter()
            .find(|(label, _)| *label == name)
            .map(|(_, value)| value)
    }
}

impl From<OpinionMetrics> for Metrics {
    fn from(metrics: OpinionMetrics) -> Self {
        Metrics::Opinion(metrics)
    }
}

impl From<VocabularyMetrics> for Metrics {
    fn from(metrics: VocabularyMetrics) -> Self {
        Metrics::Vocabulary(metrics)
    }
}

/// One row of the metric time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub step: u64,
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// Per-agent state at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: u32,
    pub x: u32,
    pub y: u32,
    pub active: bool,
    /// Advanced model only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opinion: Option<String>,
    #[serde(default)]
    pub committed: bool,
    /// Minimal model only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inventory: Vec<String>,
    /// Shares its cell with another agent
    #[serde(default)]
    pub interacting: bool,
}

/// Full model state at a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub variant: ModelVariant,
    pub step: u64,
    pub width: u32,
    pub height: u32,
    pub metrics: Metrics,
    pub agents: Vec<AgentSnapshot>,
}

/// Outcome of a complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub variant: ModelVariant,
    pub seed: u64,
    pub population: u32,
    pub steps: u64,
    /// First step at which a single opinion remained (advanced only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus_step: Option<u64>,
    pub final_metrics: Metrics,
    pub elapsed_ms: u64,
}
