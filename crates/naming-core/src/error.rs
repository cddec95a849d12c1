//! Error types for the naming game engine.

use std::path::PathBuf;

use crate::components::Position;

/// Errors raised by [`SpatialGrid`](crate::grid::SpatialGrid) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The coordinate lies outside the lattice.
    #[error("position ({}, {}) is outside the {width}x{height} grid", .position.x, .position.y)]
    OutOfBounds {
        position: Position,
        width: u32,
        height: u32,
    },

    /// The target cell already holds as many agents as allowed.
    #[error("cell ({}, {}) is at capacity ({capacity})", .position.x, .position.y)]
    CellFull { position: Position, capacity: usize },

    /// The agent was placed twice.
    #[error("agent is already on the grid")]
    AlreadyPlaced,

    /// The agent has never been placed.
    #[error("agent is not on the grid")]
    NotPlaced,

    /// Random placement gave up without finding a free cell.
    #[error("no free cell found after {attempts} placement attempts")]
    PlacementExhausted { attempts: usize },
}

/// Errors surfaced by model construction and stepping.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A construction parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The grid cannot hold the requested population.
    #[error(
        "grid {width}x{height} with {per_cell} agent(s) per cell cannot hold {population} agents"
    )]
    InsufficientCapacity {
        width: u32,
        height: u32,
        per_cell: usize,
        population: u32,
    },

    /// The word dictionary has no tokens.
    #[error("word dictionary is empty")]
    EmptyDictionary,

    /// Fewer distinct words than agents.
    ///
    /// Stricter than the one-word minimum a dictionary needs: construction
    /// demands one distinct word per agent, so every agent's invention finds
    /// a free word.
    #[error("dictionary has {words} words but the population needs at least {population}")]
    DictionaryTooSmall { words: usize, population: u32 },

    /// Every dictionary word is already in use.
    #[error("every dictionary word is already held by some agent")]
    DictionaryExhausted,

    /// The dictionary file could not be read.
    #[error("failed to read dictionary {path}: {source}")]
    DictionaryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The model has already reached its terminal state.
    #[error("model terminated at step {step}")]
    Terminated { step: u64 },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Output(#[from] crate::output::OutputError),
}

impl ModelError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ModelError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
