//! Population Spawning
//!
//! Creates the agent entities, places each one on a random free cell and
//! records the roster in id order.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::components::{Active, AgentId, Committed, Inventory, Opinion, Population, WillListen};
use crate::error::ModelError;
use crate::grid::SpatialGrid;

/// Number of committed agents for a population of `n`, rounding halves to even
pub fn committed_count(n: u32, fraction: f64) -> u32 {
    let committed = (n as f64 * fraction).round_ties_even();
    (committed.max(0.0) as u32).min(n)
}

/// Spawn the advanced model's agents.
///
/// Ids `0..n - c` hold the majority opinion; the last `c` agents are
/// committed to the minority opinion.
pub fn spawn_opinion_agents<R: Rng + ?Sized>(
    world: &mut World,
    grid: &mut SpatialGrid,
    rng: &mut R,
    n: u32,
    fraction: f64,
) -> Result<Population, ModelError> {
    let committed = committed_count(n, fraction);
    let mut agents = Vec::with_capacity(n as usize);
    for id in 0..n {
        let is_committed = id >= n - committed;
        let opinion = if is_committed {
            Opinion::Minority
        } else {
            Opinion::Majority
        };
        let entity = world
            .spawn((AgentId(id), opinion, Committed(is_committed), Active::default()))
            .id();
        let pos = grid.random_placement(entity, rng)?;
        world.entity_mut(entity).insert(pos);
        agents.push(entity);
    }
    Ok(Population::new(agents))
}

/// Spawn the minimal model's agents with empty inventories
pub fn spawn_vocabulary_agents<R: Rng + ?Sized>(
    world: &mut World,
    grid: &mut SpatialGrid,
    rng: &mut R,
    n: u32,
) -> Result<Population, ModelError> {
    let mut agents = Vec::with_capacity(n as usize);
    for id in 0..n {
        let entity = world
            .spawn((
                AgentId(id),
                Inventory::new(),
                WillListen::default(),
                Active::default(),
            ))
            .id();
        let pos = grid.random_placement(entity, rng)?;
        world.entity_mut(entity).insert(pos);
        agents.push(entity);
    }
    Ok(Population::new(agents))
}
