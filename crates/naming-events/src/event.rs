//! Interaction Events
//!
//! One record per interaction between a speaker and its listeners, written to
//! the JSONL event log when one is configured.

use serde::{Deserialize, Serialize};

/// What happened during an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// At least one listener did not hold the spoken opinion
    Disagreement,
    /// The whole group adopted the spoken opinion
    Consensus,
    /// The group agreed but the adoption trial failed
    ConsensusDeclined,
    /// A speaker with an empty inventory coined a new word
    WordInvented,
    /// The listener added the spoken word to its inventory
    WordLearned,
    /// Speaker and listener collapsed onto the shared word
    Convergence,
}

/// A single logged interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub event_id: String,
    pub step: u64,
    pub kind: InteractionKind,
    pub speaker: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<u32>,
    /// The spoken word or opinion label
    pub word: String,
    /// Listeners pushed into the mixed state (disagreement only)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub converted: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl InteractionEvent {
    pub fn new(step: u64, kind: InteractionKind, speaker: u32, word: impl Into<String>) -> Self {
        Self {
            event_id: String::new(),
            step,
            kind,
            speaker,
            listeners: Vec::new(),
            word: word.into(),
            converted: 0,
        }
    }

    pub fn with_listeners(mut self, listeners: Vec<u32>) -> Self {
        self.listeners = listeners;
        self
    }

    pub fn with_converted(mut self, converted: u32) -> Self {
        self.converted = converted;
        self
    }

    /// Serializes the event to a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_format() {
        assert_eq!(generate_event_id(1), "evt_00000001");
        assert_eq!(generate_event_id(12345678), "evt_12345678");
    }

    #[test]
    fn test_jsonl_skips_empty_fields() {
        let event = InteractionEvent::new(3, InteractionKind::WordInvented, 7, "lumo");
        let line = event.to_jsonl().unwrap();
        assert!(line.contains("\"kind\":\"word_invented\""));
        assert!(!line.contains("listeners"));
        assert!(!line.contains("converted"));

        let parsed = InteractionEvent::from_jsonl(&line).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_disagreement_keeps_listeners() {
        let event = InteractionEvent::new(9, InteractionKind::Disagreement, 1, "majority")
            .with_listeners(vec![4, 5])
            .with_converted(2);
        let value: serde_json::Value = serde_json::from_str(&event.to_jsonl().unwrap()).unwrap();
        assert_eq!(value["listeners"], serde_json::json!([4, 5]));
        assert_eq!(value["converted"], 2);
    }
}
