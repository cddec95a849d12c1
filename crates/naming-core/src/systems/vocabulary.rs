//! Word Negotiation
//!
//! The minimal model's interaction between one speaker and one listener:
//! invent a word if needed, utter a random known word, and either teach it or
//! collapse both vocabularies onto it.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::components::Inventory;
use crate::dictionary::Dictionary;
use crate::error::ModelError;
use crate::inventory::GlobalInventory;

/// Resource: interaction tallies for the current step
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionCounters {
    pub interactions: u64,
    pub successes: u64,
}

impl InteractionCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Share of this step's interactions that converged, 0 when none happened
    pub fn success_rate(&self) -> f64 {
        if self.interactions == 0 {
            return 0.0;
        }
        self.successes as f64 / self.interactions as f64
    }
}

/// What a single exchange did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub word: String,
    /// The speaker coined `word` during this exchange
    pub invented: bool,
    /// Both sides already knew `word` and collapsed onto it
    pub converged: bool,
}

/// Run one speaker → listener exchange, keeping `global` in step with both
/// inventories.
///
/// Fails only when the speaker needs a new word and every dictionary word is
/// already in use.
pub fn exchange_words<R: Rng + ?Sized>(
    speaker: &mut Inventory,
    listener: &mut Inventory,
    global: &mut GlobalInventory,
    dictionary: &Dictionary,
    counters: &mut InteractionCounters,
    rng: &mut R,
) -> Result<Exchange, ModelError> {
    let mut invented = false;
    if speaker.is_empty() {
        let word = dictionary
            .invent(global, rng)
            .ok_or(ModelError::DictionaryExhausted)?;
        global.add(&word);
        speaker.push(word);
        invented = true;
    }

    counters.interactions += 1;

    let word = speaker
        .choose(rng)
        .cloned()
        .ok_or(ModelError::DictionaryExhausted)?;

    if !listener.contains(&word) {
        listener.push(word.clone());
        global.add(&word);
        return Ok(Exchange {
            word,
            invented,
            converged: false,
        });
    }

    counters.successes += 1;
    for held in speaker.words().iter().chain(listener.words()) {
        global.remove_one(held);
    }
    speaker.collapse_to(word.clone());
    listener.collapse_to(word.clone());
    global.add(&word);
    global.add(&word);

    Ok(Exchange {
        word,
        invented,
        converged: true,
    })
}
