//! Advanced naming game: committed minority agents and group consensus.

use bevy_ecs::prelude::*;
use naming_events::{InteractionEvent, ModelSnapshot, ModelVariant, OpinionMetrics, RunSummary};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use super::engine::{Engine, Variant};
use super::RunPolicy;
use crate::components::{RunState, SimulationState};
use crate::config::AdvancedParams;
use crate::error::ModelError;
use crate::grid::SpatialGrid;
use crate::output::{EventLogger, MetricsHistory, MetricsSink};
use crate::setup::{committed_count, spawn_opinion_agents};
use crate::systems::{
    activate_random_agent, collect_opinion_metrics, reset_active_flags, StepEvents, StepFaults,
};
use crate::SimRng;

struct Opinions;

impl Variant for Opinions {
    const KIND: ModelVariant = ModelVariant::Advanced;
    type Stats = OpinionMetrics;

    fn collect(world: &mut World) -> OpinionMetrics {
        collect_opinion_metrics(world)
    }

    fn is_consensus(stats: &OpinionMetrics, _population: usize) -> bool {
        stats.only_one_opinion()
    }
}

/// Opinion dynamics on a torus with one agent per cell.
///
/// Each step activates a single random agent, which moves and then speaks
/// to the group reachable through occupied neighboring cells.
pub struct AdvancedModel {
    engine: Engine<Opinions>,
    params: AdvancedParams,
}

impl AdvancedModel {
    pub fn new(params: AdvancedParams, seed: u64) -> Result<Self, ModelError> {
        params.validate()?;

        let mut world = World::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut grid = SpatialGrid::new(params.width, params.height, AdvancedParams::CELL_CAPACITY);
        let population =
            spawn_opinion_agents(&mut world, &mut grid, &mut rng, params.n, params.fraction)?;

        world.insert_resource(grid);
        world.insert_resource(population);
        world.insert_resource(SimRng(rng));
        world.insert_resource(SimulationState::new());
        world.insert_resource(StepEvents::new());
        world.insert_resource(StepFaults::default());
        world.insert_resource(params.clone());

        let mut schedule = Schedule::default();
        schedule.add_systems((reset_active_flags, activate_random_agent).chain());

        info!(
            n = params.n,
            committed = committed_count(params.n, params.fraction),
            beta = params.beta,
            width = params.width,
            height = params.height,
            groups_size = params.groups_size,
            seed,
            "advanced model initialized"
        );

        Ok(Self {
            engine: Engine::new(world, schedule, seed),
            params,
        })
    }

    /// Advance one step and return the recorded opinion fractions
    pub fn step(&mut self) -> Result<OpinionMetrics, ModelError> {
        self.engine.advance()
    }

    /// Step according to `policy`, then terminate
    pub fn run(&mut self, policy: RunPolicy) -> Result<RunSummary, ModelError> {
        self.engine.run(policy)
    }

    /// Opinion fractions of the current state
    pub fn metrics(&mut self) -> OpinionMetrics {
        self.engine.metrics()
    }

    /// No agent is mixed and only one pure opinion is held
    pub fn only_one_opinion(&mut self) -> bool {
        self.engine.is_consensus()
    }

    pub fn params(&self) -> &AdvancedParams {
        &self.params
    }

    pub fn step_count(&self) -> u64 {
        self.engine.step_count()
    }

    pub fn run_state(&self) -> RunState {
        self.engine.run_state()
    }

    pub fn seed(&self) -> u64 {
        self.engine.seed()
    }

    pub fn terminate(&mut self) -> Result<(), ModelError> {
        self.engine.terminate()
    }

    pub fn history(&self) -> &MetricsHistory {
        self.engine.history()
    }

    /// Interactions of the most recent step
    pub fn last_events(&self) -> &[InteractionEvent] {
        self.engine.last_events()
    }

    pub fn add_sink(&mut self, sink: Box<dyn MetricsSink>) {
        self.engine.add_sink(sink);
    }

    pub fn set_event_logger(&mut self, logger: EventLogger) {
        self.engine.set_event_logger(logger);
    }

    pub fn snapshot(&mut self) -> ModelSnapshot {
        self.engine.snapshot()
    }

    pub fn world(&self) -> &World {
        self.engine.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.engine.world_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Committed, Opinion};
    use crate::output::OutputError;

    fn params(n: u32, fraction: f64, beta: f64) -> AdvancedParams {
        AdvancedParams {
            n,
            fraction,
            beta,
            width: 10,
            height: 10,
            groups_size: 5,
        }
    }

    #[test]
    fn test_initial_state() {
        let mut model = AdvancedModel::new(params(50, 0.1, 0.5), 1).unwrap();
        assert_eq!(model.run_state(), RunState::Initialized);
        assert_eq!(model.step_count(), 0);

        let metrics = model.metrics();
        assert_eq!(metrics.minority_opinion, 0.1);
        assert_eq!(metrics.general_opinion, 0.9);
        assert_eq!(metrics.mixed_opinion, 0.0);
        assert!(!model.only_one_opinion());
    }

    #[test]
    fn test_step_records_history() {
        let mut model = AdvancedModel::new(params(50, 0.1, 0.5), 2).unwrap();
        for _ in 0..20 {
            model.step().unwrap();
        }
        assert_eq!(model.run_state(), RunState::Running);
        assert_eq!(model.step_count(), 20);
        assert_eq!(model.history().len(), 20);
        assert_eq!(model.history().records()[0].step, 1);
    }

    #[test]
    fn test_no_committed_agents_is_already_consensus() {
        let mut model = AdvancedModel::new(params(30, 0.0, 0.5), 3).unwrap();
        assert!(model.only_one_opinion());

        let summary = model.run(RunPolicy::until_consensus(10, 1000)).unwrap();
        assert_eq!(summary.steps, 10);
        assert_eq!(summary.consensus_step, Some(0));
        assert_eq!(model.run_state(), RunState::Terminated);
    }

    #[test]
    fn test_step_after_termination_fails() {
        let mut model = AdvancedModel::new(params(10, 0.1, 0.5), 4).unwrap();
        model.step().unwrap();
        model.terminate().unwrap();
        assert!(matches!(model.step(), Err(ModelError::Terminated { step: 1 })));
    }

    struct FailingSink;

    impl MetricsSink for FailingSink {
        fn record(&mut self, _record: &naming_events::MetricsRecord) -> Result<(), OutputError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[test]
    fn test_sink_failure_terminates_model() {
        let mut model = AdvancedModel::new(params(40, 0.1, 0.5), 7).unwrap();
        model.add_sink(Box::new(FailingSink));

        assert!(matches!(model.step(), Err(ModelError::Output(_))));
        assert_eq!(model.run_state(), RunState::Terminated);
        assert!(model.last_events().len() <= 1);
        assert!(matches!(model.step(), Err(ModelError::Terminated { step: 1 })));
        assert!(model.world().resource::<StepEvents>().is_empty());
    }

    #[test]
    fn test_snapshot_lists_agents_in_id_order() {
        let mut model = AdvancedModel::new(params(20, 0.1, 0.5), 5).unwrap();
        model.step().unwrap();

        let snapshot = model.snapshot();
        assert_eq!(snapshot.variant, ModelVariant::Advanced);
        assert_eq!(snapshot.agents.len(), 20);
        for (index, agent) in snapshot.agents.iter().enumerate() {
            assert_eq!(agent.agent_id as usize, index);
            assert!(agent.opinion.is_some());
            assert!(!agent.interacting);
        }
        assert_eq!(snapshot.agents.iter().filter(|a| a.committed).count(), 2);
        assert!(snapshot.agents.iter().any(|a| a.active));
    }

    #[test]
    fn test_committed_agents_keep_minority() {
        let mut model = AdvancedModel::new(params(60, 0.2, 1.0), 6).unwrap();
        for _ in 0..500 {
            model.step().unwrap();
        }
        let world = model.world_mut();
        let mut query = world.query::<(&Opinion, &Committed)>();
        for (opinion, committed) in query.iter(world) {
            if committed.0 {
                assert_eq!(*opinion, Opinion::Minority);
            }
        }
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(matches!(
            AdvancedModel::new(params(101, 0.1, 0.5), 0),
            Err(ModelError::InsufficientCapacity { .. })
        ));
        assert!(matches!(
            AdvancedModel::new(params(10, -0.1, 0.5), 0),
            Err(ModelError::InvalidParameter { name: "fraction", .. })
        ));
    }
}
