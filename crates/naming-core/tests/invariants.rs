//! Invariants that must hold after every step of either model.

use bevy_ecs::prelude::*;
use naming_core::config::{AdvancedParams, MinimalParams};
use naming_core::{
    AdvancedModel, Committed, Dictionary, GlobalInventory, Inventory, MinimalModel, ModelError,
    Opinion, SpatialGrid,
};
use naming_events::InteractionKind;
use std::collections::HashMap;

fn word_counts(world: &mut World) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    let mut query = world.query::<&Inventory>();
    for inventory in query.iter(world) {
        for word in inventory.words() {
            *counts.entry(word.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn assert_inventory_consistent(model: &mut MinimalModel) {
    let expected = word_counts(model.world_mut());
    let global = model.global_inventory();
    assert_eq!(global.total_words(), expected.values().sum::<usize>());
    assert_eq!(global.distinct_words(), expected.len());
    for (word, count) in &expected {
        assert_eq!(global.multiplicity(word), *count, "multiplicity of {word}");
    }
}

#[test]
fn test_global_inventory_matches_agents_every_step() {
    let mut model = MinimalModel::new(
        MinimalParams {
            n: 50,
            width: 6,
            height: 6,
            ..MinimalParams::default()
        },
        11,
    )
    .unwrap();

    for _ in 0..60 {
        model.step().unwrap();
        assert_inventory_consistent(&mut model);
        assert!(model.world().resource::<SpatialGrid>().max_occupancy() <= 2);
    }
}

#[test]
fn test_random_interactions_keep_inventory_consistent() {
    let mut model = MinimalModel::new(
        MinimalParams {
            n: 30,
            width: 5,
            height: 5,
            random_interactions: true,
            ..MinimalParams::default()
        },
        12,
    )
    .unwrap();

    for _ in 0..30 {
        model.step().unwrap();
        assert_inventory_consistent(&mut model);
    }
}

#[test]
fn test_convergence_leaves_single_word_inventories() {
    let mut model = MinimalModel::new(
        MinimalParams {
            n: 40,
            width: 5,
            height: 5,
            ..MinimalParams::default()
        },
        13,
    )
    .unwrap();

    let mut checked = 0;
    for _ in 0..60 {
        model.step().unwrap();
        // Nobody interacts after the final event of a step.
        let Some(last) = model.last_events().last().cloned() else {
            continue;
        };
        if last.kind != InteractionKind::Convergence {
            continue;
        }
        let snapshot = model.snapshot();
        for id in std::iter::once(last.speaker).chain(last.listeners) {
            assert_eq!(snapshot.agents[id as usize].inventory, vec![last.word.clone()]);
        }
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn test_occupancy_and_commitment_hold_in_advanced_model() {
    let mut model = AdvancedModel::new(
        AdvancedParams {
            n: 120,
            fraction: 0.25,
            beta: 0.8,
            width: 12,
            height: 12,
            groups_size: 4,
        },
        14,
    )
    .unwrap();

    for _ in 0..400 {
        model.step().unwrap();
        assert!(model.world().resource::<SpatialGrid>().max_occupancy() <= 1);

        let world = model.world_mut();
        let mut query = world.query::<(&Opinion, &Committed)>();
        for (opinion, committed) in query.iter(world) {
            if committed.0 {
                assert_eq!(*opinion, Opinion::Minority);
            }
        }
        for event in model.last_events() {
            assert!(event.listeners.len() <= 3);
        }
    }
}

#[test]
fn test_disagreement_mixes_uncommitted_listeners() {
    // Fully packed grid: nobody moves and every activation reaches a group.
    let mut model = AdvancedModel::new(
        AdvancedParams {
            n: 100,
            fraction: 0.5,
            beta: 0.0,
            width: 10,
            height: 10,
            groups_size: 3,
        },
        15,
    )
    .unwrap();
    let mut mixed_seen = false;
    for _ in 0..200 {
        model.step().unwrap();
        for event in model.last_events() {
            assert_ne!(event.kind, InteractionKind::Consensus);
            mixed_seen |= event.converted > 0;
        }
    }
    assert!(mixed_seen);
}

#[test]
fn test_two_agents_on_small_torus() {
    let dictionary = Dictionary::from_words(["x", "y"]).unwrap();
    let mut model = MinimalModel::with_dictionary(
        MinimalParams {
            n: 2,
            width: 2,
            height: 2,
            ..MinimalParams::default()
        },
        dictionary,
        21,
    )
    .unwrap();

    let mut invented = None;
    for _ in 0..200 {
        model.step().unwrap();
        assert_inventory_consistent(&mut model);
        if let Some(event) = model
            .last_events()
            .iter()
            .find(|e| e.kind == InteractionKind::WordInvented)
        {
            assert!(invented.is_none(), "each agent invents at most once here");
            invented = Some(event.word.clone());
            assert_eq!(model.global_inventory().multiplicity(&event.word), 2);
        }
        if model.has_converged() {
            break;
        }
    }

    let word = invented.expect("the agents met at least once");
    assert!(model.has_converged());
    let global: &GlobalInventory = model.global_inventory();
    assert_eq!(global.multiplicity(&word), 2);
    assert_eq!(global.total_words(), 2);
}

#[test]
fn test_construction_errors() {
    let too_many = AdvancedModel::new(
        AdvancedParams {
            n: 10,
            width: 3,
            height: 3,
            ..AdvancedParams::default()
        },
        0,
    );
    assert!(matches!(too_many, Err(ModelError::InsufficientCapacity { .. })));

    let empty = Dictionary::from_words(Vec::<String>::new());
    assert!(matches!(empty, Err(ModelError::EmptyDictionary)));

    let missing = MinimalModel::new(
        MinimalParams {
            dictionary: Some("/nonexistent/words".into()),
            ..MinimalParams::default()
        },
        0,
    );
    assert!(matches!(missing, Err(ModelError::DictionaryIo { .. })));
}

#[test]
fn test_stepping_terminated_model_fails() {
    let mut model = MinimalModel::new(
        MinimalParams {
            n: 4,
            width: 2,
            height: 2,
            ..MinimalParams::default()
        },
        0,
    )
    .unwrap();
    model.step().unwrap();
    model.terminate().unwrap();
    assert!(matches!(model.step(), Err(ModelError::Terminated { step: 1 })));
    assert_eq!(model.history().len(), 1);
}
