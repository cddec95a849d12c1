//! Simulation Models
//!
//! Each model owns an ECS world, a single-threaded schedule and the metric
//! history. Stepping moves the run state from Initialized to Running; a model
//! that has been terminated refuses further steps.

mod advanced;
mod engine;
mod minimal;

pub use advanced::AdvancedModel;
pub use minimal::MinimalModel;

use crate::config::RunConfig;

/// When a batch run stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPolicy {
    /// Hard upper bound on the step count
    pub max_steps: u64,
    /// Consensus before this step does not end the run
    pub min_steps: u64,
    pub stop_on_consensus: bool,
}

impl RunPolicy {
    /// Run exactly `steps` steps
    pub fn fixed(steps: u64) -> Self {
        Self {
            max_steps: steps,
            min_steps: steps,
            stop_on_consensus: false,
        }
    }

    /// Run until consensus once `min_steps` have passed, at most `max_steps`
    pub fn until_consensus(min_steps: u64, max_steps: u64) -> Self {
        Self {
            max_steps,
            min_steps,
            stop_on_consensus: true,
        }
    }

    /// Whether a run at `step` with consensus state `consensus` should end
    pub fn should_stop(&self, step: u64, consensus: bool) -> bool {
        step >= self.max_steps || (self.stop_on_consensus && consensus && step >= self.min_steps)
    }
}

impl From<&RunConfig> for RunPolicy {
    fn from(config: &RunConfig) -> Self {
        Self {
            max_steps: config.steps,
            min_steps: config.min_steps,
            stop_on_consensus: config.stop_on_consensus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_policy_ignores_consensus() {
        let policy = RunPolicy::fixed(10);
        assert!(!policy.should_stop(3, true));
        assert!(policy.should_stop(10, false));
    }

    #[test]
    fn test_consensus_respects_min_steps() {
        let policy = RunPolicy::until_consensus(5, 100);
        assert!(!policy.should_stop(4, true));
        assert!(policy.should_stop(5, true));
        assert!(!policy.should_stop(50, false));
        assert!(policy.should_stop(100, false));
    }
}
