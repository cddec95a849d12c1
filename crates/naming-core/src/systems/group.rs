//! Group Discovery
//!
//! Collects the interaction group of a speaker: agents transitively adjacent
//! to it on the grid, visited breadth-first and capped in size.

use bevy_ecs::prelude::*;
use std::collections::{HashSet, VecDeque};

use crate::grid::SpatialGrid;

/// Listeners reachable from `speaker` through chains of Moore neighbors.
///
/// Holds at most `max_group_size - 1` agents, never the speaker, never the
/// same agent twice. Agents are returned in discovery order.
pub fn discover_group(grid: &SpatialGrid, speaker: Entity, max_group_size: usize) -> Vec<Entity> {
    let cap = max_group_size.saturating_sub(1);
    let mut group = Vec::new();
    if cap == 0 {
        return group;
    }
    let Some(origin) = grid.locate(speaker) else {
        return group;
    };

    let mut visited = HashSet::from([speaker]);
    let mut frontier = VecDeque::from([origin]);
    while let Some(pos) = frontier.pop_front() {
        for mate in grid.neighbors(pos) {
            if !visited.insert(mate) {
                continue;
            }
            group.push(mate);
            if group.len() >= cap {
                return group;
            }
            if let Some(next) = grid.locate(mate) {
                frontier.push_back(next);
            }
        }
    }
    group
}
