//! Shared stepping loop
//!
//! Advances the run state, runs the schedule, surfaces faults raised by
//! systems and fans the step's metrics and events out to the sinks.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use naming_events::{
    AgentSnapshot, InteractionEvent, Metrics, MetricsRecord, ModelSnapshot, ModelVariant,
    RunSummary,
};
use std::time::Instant;
use tracing::{debug, info, trace};

use super::RunPolicy;
use crate::components::{
    Active, AgentId, Committed, Inventory, Opinion, Population, Position, RunState,
    SimulationState,
};
use crate::error::ModelError;
use crate::grid::SpatialGrid;
use crate::output::{EventLogger, MetricsHistory, MetricsSink, OutputError};
use crate::systems::{StepEvents, StepFaults};

/// Variant-specific metric collection
pub(crate) trait Variant {
    const KIND: ModelVariant;
    type Stats: Copy + Into<Metrics>;

    fn collect(world: &mut World) -> Self::Stats;

    /// Whether the population has settled on a single opinion or word
    fn is_consensus(stats: &Self::Stats, population: usize) -> bool;
}

pub(crate) struct Engine<V: Variant> {
    world: World,
    schedule: Schedule,
    history: MetricsHistory,
    sinks: Vec<Box<dyn MetricsSink>>,
    logger: Option<EventLogger>,
    last_events: Vec<InteractionEvent>,
    seed: u64,
    _variant: std::marker::PhantomData<V>,
}

impl<V: Variant> Engine<V> {
    /// Wrap a populated world; the schedule is forced onto one thread so the
    /// shared RNG is consumed in a fixed order.
    pub fn new(world: World, mut schedule: Schedule, seed: u64) -> Self {
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        Self {
            world,
            schedule,
            history: MetricsHistory::new(),
            sinks: Vec::new(),
            logger: None,
            last_events: Vec::new(),
            seed,
            _variant: std::marker::PhantomData,
        }
    }

    pub fn advance(&mut self) -> Result<V::Stats, ModelError> {
        let step = {
            let mut state = self.world.resource_mut::<SimulationState>();
            if state.is_terminated() {
                return Err(ModelError::Terminated { step: state.step });
            }
            state.advance_step();
            state.step
        };

        self.schedule.run(&mut self.world);
        self.last_events = self.world.resource_mut::<StepEvents>().drain();

        let fault = self.world.resource_mut::<StepFaults>().take();
        if let Some(fault) = fault {
            self.world.resource_mut::<SimulationState>().terminate();
            return Err(fault);
        }

        let stats = V::collect(&mut self.world);
        let record = MetricsRecord {
            step,
            metrics: stats.into(),
        };
        self.history.push(record);

        // Output failures end the run.
        if let Err(e) = self.emit(&record) {
            self.world.resource_mut::<SimulationState>().terminate();
            return Err(e.into());
        }
        trace!(step, events = self.last_events.len(), "step complete");
        Ok(stats)
    }

    fn emit(&mut self, record: &MetricsRecord) -> Result<(), OutputError> {
        for sink in &mut self.sinks {
            sink.record(record)?;
        }
        if let Some(logger) = &mut self.logger {
            logger.log_batch(&self.last_events)?;
        }
        Ok(())
    }

    /// Step until the policy says stop, then terminate
    pub fn run(&mut self, policy: RunPolicy) -> Result<RunSummary, ModelError> {
        let started = Instant::now();
        let population = self.population();
        let mut stats = self.metrics();
        let mut consensus_step =
            V::is_consensus(&stats, population).then(|| self.step_count());

        while !policy.should_stop(self.step_count(), V::is_consensus(&stats, population)) {
            stats = self.advance()?;
            if consensus_step.is_none() && V::is_consensus(&stats, population) {
                consensus_step = Some(self.step_count());
                debug!(step = self.step_count(), "consensus reached");
            }
        }
        self.terminate()?;

        let summary = RunSummary {
            variant: V::KIND,
            seed: self.seed,
            population: population as u32,
            steps: self.step_count(),
            consensus_step,
            final_metrics: stats.into(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            variant = %summary.variant,
            steps = summary.steps,
            consensus_step = ?summary.consensus_step,
            elapsed_ms = summary.elapsed_ms,
            "run finished"
        );
        Ok(summary)
    }

    /// Enter the terminal state and flush every output
    pub fn terminate(&mut self) -> Result<(), ModelError> {
        self.world.resource_mut::<SimulationState>().terminate();
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        if let Some(logger) = &mut self.logger {
            logger.flush()?;
        }
        Ok(())
    }

    /// Metrics of the current state, without recording them
    pub fn metrics(&mut self) -> V::Stats {
        V::collect(&mut self.world)
    }

    pub fn is_consensus(&mut self) -> bool {
        let population = self.population();
        V::is_consensus(&self.metrics(), population)
    }

    pub fn step_count(&self) -> u64 {
        self.world.resource::<SimulationState>().step
    }

    pub fn run_state(&self) -> RunState {
        self.world.resource::<SimulationState>().run_state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn population(&self) -> usize {
        self.world.resource::<Population>().len()
    }

    pub fn history(&self) -> &MetricsHistory {
        &self.history
    }

    pub fn last_events(&self) -> &[InteractionEvent] {
        &self.last_events
    }

    pub fn add_sink(&mut self, sink: Box<dyn MetricsSink>) {
        self.sinks.push(sink);
    }

    pub fn set_event_logger(&mut self, logger: EventLogger) {
        self.logger = Some(logger);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Every agent's state, ordered by id
    pub fn snapshot(&mut self) -> ModelSnapshot {
        let metrics = self.metrics().into();
        let step = self.step_count();
        let (width, height) = {
            let grid = self.world.resource::<SpatialGrid>();
            (grid.width(), grid.height())
        };

        let mut query = self.world.query::<(
            &AgentId,
            &Position,
            &Active,
            Option<&Opinion>,
            Option<&Committed>,
            Option<&Inventory>,
        )>();
        let grid = self.world.resource::<SpatialGrid>();
        let mut agents: Vec<AgentSnapshot> = query
            .iter(&self.world)
            .map(|(id, pos, active, opinion, committed, inventory)| AgentSnapshot {
                agent_id: id.0,
                x: pos.x,
                y: pos.y,
                active: active.0,
                opinion: opinion.map(|o| o.label().to_string()),
                committed: committed.is_some_and(|c| c.0),
                inventory: inventory.map(|i| i.words().to_vec()).unwrap_or_default(),
                interacting: grid.occupancy(*pos) > 1,
            })
            .collect();
        agents.sort_by_key(|a| a.agent_id);

        ModelSnapshot {
            variant: V::KIND,
            step,
            width,
            height,
            metrics,
            agents,
        }
    }
}
