//! World Components
//!
//! Grid coordinates, the fixed population roster and the run state machine.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Component: an agent's cell on the toroidal grid
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Position {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Lifecycle of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Initialized,
    Running,
    Terminated,
}

/// Global simulation state resource
#[derive(Resource, Debug, Clone, Default)]
pub struct SimulationState {
    /// Number of completed or in-progress steps (1-based while a step runs)
    pub step: u64,
    pub run_state: RunState,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the next step, leaving `Initialized` on the first call
    pub fn advance_step(&mut self) {
        self.step += 1;
        self.run_state = RunState::Running;
    }

    pub fn terminate(&mut self) {
        self.run_state = RunState::Terminated;
    }

    pub fn is_terminated(&self) -> bool {
        self.run_state == RunState::Terminated
    }
}

/// Resource: every agent entity, ordered by agent id
///
/// The population is fixed at creation; random activation and partner
/// selection index into this list so runs stay reproducible.
#[derive(Resource, Debug, Clone, Default)]
pub struct Population {
    agents: Vec<Entity>,
}

impl Population {
    pub fn new(agents: Vec<Entity>) -> Self {
        Self { agents }
    }

    pub fn agents(&self) -> &[Entity] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_state_transitions() {
        let mut state = SimulationState::new();
        assert_eq!(state.run_state, RunState::Initialized);
        assert_eq!(state.step, 0);

        state.advance_step();
        state.advance_step();
        assert_eq!(state.run_state, RunState::Running);
        assert_eq!(state.step, 2);

        state.terminate();
        assert!(state.is_terminated());
    }

    #[test]
    fn test_position_from_tuple() {
        assert_eq!(Position::from((3, 4)), Position::new(3, 4));
    }
}
