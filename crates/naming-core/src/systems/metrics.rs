//! Metric Collection
//!
//! Aggregate statistics recorded after every step.

use bevy_ecs::prelude::*;
use naming_events::{OpinionMetrics, VocabularyMetrics};

use crate::components::Opinion;
use crate::inventory::GlobalInventory;

use super::vocabulary::InteractionCounters;

/// Fractions of agents holding each opinion
pub fn collect_opinion_metrics(world: &mut World) -> OpinionMetrics {
    let (mut minority, mut general, mut mixed) = (0usize, 0usize, 0usize);
    let mut query = world.query::<&Opinion>();
    for opinion in query.iter(world) {
        match opinion {
            Opinion::Minority => minority += 1,
            Opinion::Majority => general += 1,
            Opinion::Mixed => mixed += 1,
        }
    }
    OpinionMetrics::from_counts(minority, general, mixed, minority + general + mixed)
}

/// Vocabulary size, diversity and this step's success rate
pub fn collect_vocabulary_metrics(world: &World) -> VocabularyMetrics {
    let (total_words, different_words) = world
        .get_resource::<GlobalInventory>()
        .map(|g| (g.total_words() as u64, g.distinct_words() as u64))
        .unwrap_or_default();
    let prob_success = world
        .get_resource::<InteractionCounters>()
        .map(InteractionCounters::success_rate)
        .unwrap_or_default();

    VocabularyMetrics {
        total_words,
        different_words,
        prob_success,
    }
}
