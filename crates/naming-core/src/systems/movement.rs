//! Movement
//!
//! Agents step to a random neighboring cell with room left, or stay put.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::Position;
use crate::grid::SpatialGrid;

/// Move `entity` to the first free cell of its shuffled Moore neighborhood.
///
/// Returns the agent's position afterwards (unchanged when every neighbor is
/// full), or `None` when the agent is not on the grid.
pub fn relocate<R: Rng + ?Sized>(
    grid: &mut SpatialGrid,
    entity: Entity,
    rng: &mut R,
) -> Option<Position> {
    let current = grid.locate(entity)?;
    let mut candidates = grid.neighborhood(current, false);
    candidates.shuffle(rng);

    for candidate in candidates {
        if grid.has_room(candidate) && grid.move_agent(entity, candidate).is_ok() {
            return Some(candidate);
        }
    }
    Some(current)
}
