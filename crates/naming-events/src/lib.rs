//! Shared record types and serialization for the naming game simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces these records; writers and analysis tools consume them.

pub mod event;
pub mod snapshot;

// Re-export event types
pub use event::{generate_event_id, InteractionEvent, InteractionKind};

// Re-export snapshot types
pub use snapshot::{
    AgentSnapshot, Metrics, MetricsRecord, ModelSnapshot, ModelVariant, OpinionMetrics,
    RunSummary, VocabularyMetrics,
};
