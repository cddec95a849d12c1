//! ECS Systems
//!
//! Movement, group discovery, the two interaction protocols, per-step
//! activation and metric collection.

pub mod activation;
pub mod group;
pub mod metrics;
pub mod movement;
pub mod opinion;
pub mod vocabulary;

// Re-export commonly used systems
pub use activation::{
    activate_population, activate_random_agent, reset_active_flags, reset_interaction_counters,
    StepEvents, StepFaults,
};
pub use group::discover_group;
pub use metrics::{collect_opinion_metrics, collect_vocabulary_metrics};
pub use movement::relocate;
pub use opinion::{negotiate, Listener, Negotiation, NegotiationOutcome};
pub use vocabulary::{exchange_words, Exchange, InteractionCounters};
