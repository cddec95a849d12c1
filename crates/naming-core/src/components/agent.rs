//! Agent Components
//!
//! Components for individual agents: identity, opinion, vocabulary and the
//! per-step activity flags.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique identifier for an agent, stable for the whole run
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AgentId(pub u32);

/// Set for the agent that interacted most recently and its partners
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Active(pub bool);

/// Committed agents never give up their opinion
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Committed(pub bool);

/// Marks the agent as the passive partner of its next activation
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WillListen(pub bool);

/// Belief state in the advanced model
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opinion {
    /// The opinion everyone starts with
    Majority,
    /// The opinion held by committed agents
    Minority,
    /// Both opinions at once, pending resolution
    Mixed,
}

impl Opinion {
    /// Whether an agent with this opinion already knows the spoken `word`.
    ///
    /// A mixed agent knows both pure opinions.
    pub fn holds(&self, word: Opinion) -> bool {
        *self == Opinion::Mixed || *self == word
    }

    pub fn is_pure(&self) -> bool {
        *self != Opinion::Mixed
    }

    /// The word an agent with this opinion utters.
    ///
    /// Mixed agents pick one of the two pure opinions with equal probability.
    pub fn spoken_word<R: Rng + ?Sized>(&self, rng: &mut R) -> Opinion {
        match self {
            Opinion::Mixed => {
                if rng.gen_bool(0.5) {
                    Opinion::Majority
                } else {
                    Opinion::Minority
                }
            }
            pure => *pure,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Opinion::Majority => "majority",
            Opinion::Minority => "minority",
            Opinion::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for Opinion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Words known to an agent in the minimal model, in the order learned
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    words: Vec<String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn push(&mut self, word: impl Into<String>) {
        self.words.push(word.into());
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Uniformly random word from the inventory
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&String> {
        self.words.choose(rng)
    }

    /// Forget everything except `word`
    pub fn collapse_to(&mut self, word: impl Into<String>) {
        self.words.clear();
        self.words.push(word.into());
    }
}
