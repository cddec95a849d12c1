//! Minimal naming game: pairwise word invention and negotiation.

use bevy_ecs::prelude::*;
use naming_events::{InteractionEvent, ModelSnapshot, ModelVariant, RunSummary, VocabularyMetrics};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use super::engine::{Engine, Variant};
use super::RunPolicy;
use crate::components::{RunState, SimulationState};
use crate::config::MinimalParams;
use crate::dictionary::Dictionary;
use crate::error::ModelError;
use crate::grid::SpatialGrid;
use crate::inventory::GlobalInventory;
use crate::output::{EventLogger, MetricsHistory, MetricsSink};
use crate::setup::spawn_vocabulary_agents;
use crate::systems::{
    activate_population, collect_vocabulary_metrics, reset_active_flags,
    reset_interaction_counters, InteractionCounters, StepEvents, StepFaults,
};
use crate::SimRng;

struct Vocabulary;

impl Variant for Vocabulary {
    const KIND: ModelVariant = ModelVariant::Minimal;
    type Stats = VocabularyMetrics;

    fn collect(world: &mut World) -> VocabularyMetrics {
        collect_vocabulary_metrics(world)
    }

    /// Every agent holds exactly the same single word
    fn is_consensus(stats: &VocabularyMetrics, population: usize) -> bool {
        stats.different_words == 1 && stats.total_words == population as u64
    }
}

/// The two-agent naming game on a torus with up to two agents per cell.
///
/// Each step activates every agent once in a fresh random order.
pub struct MinimalModel {
    engine: Engine<Vocabulary>,
    params: MinimalParams,
}

impl MinimalModel {
    /// Build a model, loading the word file named in `params` or generating
    /// a synthetic dictionary when none is given
    pub fn new(params: MinimalParams, seed: u64) -> Result<Self, ModelError> {
        params.validate()?;
        let dictionary = match &params.dictionary {
            Some(path) => Dictionary::load(path)?,
            None => Dictionary::synthetic(params.synthetic_dictionary_size)?,
        };
        Self::with_dictionary(params, dictionary, seed)
    }

    /// Build a model around an already loaded dictionary
    pub fn with_dictionary(
        params: MinimalParams,
        dictionary: Dictionary,
        seed: u64,
    ) -> Result<Self, ModelError> {
        params.validate()?;
        if dictionary.len() < params.n as usize {
            return Err(ModelError::DictionaryTooSmall {
                words: dictionary.len(),
                population: params.n,
            });
        }

        let mut world = World::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut grid = SpatialGrid::new(params.width, params.height, MinimalParams::CELL_CAPACITY);
        let population = spawn_vocabulary_agents(&mut world, &mut grid, &mut rng, params.n)?;

        info!(
            n = params.n,
            width = params.width,
            height = params.height,
            random_interactions = params.random_interactions,
            dictionary = dictionary.len(),
            seed,
            "minimal model initialized"
        );

        world.insert_resource(grid);
        world.insert_resource(population);
        world.insert_resource(dictionary);
        world.insert_resource(GlobalInventory::new());
        world.insert_resource(InteractionCounters::default());
        world.insert_resource(SimRng(rng));
        world.insert_resource(SimulationState::new());
        world.insert_resource(StepEvents::new());
        world.insert_resource(StepFaults::default());
        world.insert_resource(params.clone());

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (reset_active_flags, reset_interaction_counters, activate_population).chain(),
        );

        Ok(Self {
            engine: Engine::new(world, schedule, seed),
            params,
        })
    }

    /// Advance one step and return the recorded vocabulary statistics
    pub fn step(&mut self) -> Result<VocabularyMetrics, ModelError> {
        self.engine.advance()
    }

    /// Step according to `policy`, then terminate
    pub fn run(&mut self, policy: RunPolicy) -> Result<RunSummary, ModelError> {
        self.engine.run(policy)
    }

    /// Vocabulary statistics of the current state
    pub fn metrics(&mut self) -> VocabularyMetrics {
        self.engine.metrics()
    }

    /// Every agent holds the same single word
    pub fn has_converged(&mut self) -> bool {
        self.engine.is_consensus()
    }

    pub fn global_inventory(&self) -> &GlobalInventory {
        self.engine.world().resource::<GlobalInventory>()
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.engine.world().resource::<Dictionary>()
    }

    pub fn params(&self) -> &MinimalParams {
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
    use naming_events::InteractionKind;

    fn params(n: u32, width: u32, height: u32) -> MinimalParams {
        MinimalParams {
            n,
            width,
            height,
            ..MinimalParams::default()
        }
    }

    #[test]
    fn test_initial_state_is_empty() {
        let mut model = MinimalModel::new(params(20, 5, 5), 1).unwrap();
        assert_eq!(model.run_state(), RunState::Initialized);
        assert_eq!(model.metrics(), VocabularyMetrics::default());
        assert!(model.global_inventory().is_empty());
        assert_eq!(model.dictionary().len(), 10_000);
    }

    #[test]
    fn test_two_agents_share_a_word() {
        // A 1x1 torus keeps both agents in the only cell.
        let dictionary = Dictionary::from_words(["x", "y"]).unwrap();
        let mut model = MinimalModel::with_dictionary(params(2, 1, 1), dictionary, 9).unwrap();

        let first = model.step().unwrap();
        assert_eq!(first.total_words, 2);
        assert_eq!(first.different_words, 1);
        assert_eq!(first.prob_success, 0.0);
        let events = model.last_events();
        assert_eq!(events[0].kind, InteractionKind::WordInvented);
        assert_eq!(events[1].kind, InteractionKind::WordLearned);
        let word = events[0].word.clone();
        assert_eq!(model.global_inventory().multiplicity(&word), 2);

        // The listener of step one speaks next and both already know the word.
        let second = model.step().unwrap();
        assert_eq!(second.total_words, 2);
        assert_eq!(second.prob_success, 1.0);
        assert_eq!(model.last_events()[0].kind, InteractionKind::Convergence);
        assert_eq!(model.global_inventory().multiplicity(&word), 2);
        assert!(model.has_converged());
    }

    #[test]
    fn test_run_stops_on_shared_word() {
        let dictionary = Dictionary::from_words(["x", "y"]).unwrap();
        let mut model = MinimalModel::with_dictionary(params(2, 1, 1), dictionary, 9).unwrap();

        let summary = model.run(RunPolicy::until_consensus(1, 100)).unwrap();
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.consensus_step, Some(1));
        assert_eq!(model.run_state(), RunState::Terminated);
    }

    #[test]
    fn test_random_interactions_do_not_move_agents() {
        let mut model = MinimalModel::new(
            MinimalParams {
                random_interactions: true,
                ..params(30, 6, 6)
            },
            2,
        )
        .unwrap();
        let before = model.snapshot();
        for _ in 0..5 {
            model.step().unwrap();
        }
        let after = model.snapshot();

        for (a, b) in before.agents.iter().zip(&after.agents) {
            assert_eq!((a.x, a.y), (b.x, b.y));
        }
        // Every agent has spoken at least once.
        assert!(after.agents.iter().all(|a| !a.inventory.is_empty()));
    }

    #[test]
    fn test_dictionary_must_cover_population() {
        let dictionary = Dictionary::from_words(["x", "y"]).unwrap();
        assert!(matches!(
            MinimalModel::with_dictionary(params(3, 2, 2), dictionary, 0),
            Err(ModelError::DictionaryTooSmall { words: 2, population: 3 })
        ));
        assert!(matches!(
            MinimalModel::new(params(9, 2, 2), 0),
            Err(ModelError::InsufficientCapacity { .. })
        ));
    }

    #[test]
    fn test_run_for_fixed_steps() {
        let mut model = MinimalModel::new(params(40, 8, 8), 3).unwrap();
        let summary = model.run(RunPolicy::fixed(25)).unwrap();
        assert_eq!(summary.steps, 25);
        assert_eq!(summary.variant, ModelVariant::Minimal);
        assert_eq!(model.history().len(), 25);
        assert!(matches!(model.step(), Err(ModelError::Terminated { step: 25 })));
    }
}
