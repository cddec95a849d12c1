//! Naming Game Simulation Engine Library
//!
//! Agents wander a toroidal grid and negotiate a shared name. Two variants are
//! provided: [`AdvancedModel`] (group consensus with committed minority agents)
//! and [`MinimalModel`] (pairwise word invention and convergence).

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod grid;
pub mod inventory;
pub mod model;
pub mod output;
pub mod setup;
pub mod systems;

pub use components::*;
pub use config::{AdvancedParams, Config, ConfigError, MinimalParams, RunConfig};
pub use dictionary::Dictionary;
pub use error::{GridError, ModelError};
pub use grid::SpatialGrid;
pub use inventory::GlobalInventory;
pub use model::{AdvancedModel, MinimalModel, RunPolicy};

/// Seeded random number generator resource
///
/// Every random draw of a run goes through this single generator.
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
