//! Activation Systems
//!
//! Per-step scheduling: the advanced model activates one random agent, the
//! minimal model sweeps the whole population in a fresh random order.

use bevy_ecs::prelude::*;
use naming_events::{generate_event_id, InteractionEvent, InteractionKind};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::components::{
    Active, AgentId, Committed, Inventory, Opinion, Population, Position, SimulationState,
    WillListen,
};
use crate::config::{AdvancedParams, MinimalParams};
use crate::dictionary::Dictionary;
use crate::error::ModelError;
use crate::grid::SpatialGrid;
use crate::inventory::GlobalInventory;
use crate::SimRng;

use super::group::discover_group;
use super::movement::relocate;
use super::opinion::{negotiate, Listener, NegotiationOutcome};
use super::vocabulary::{exchange_words, InteractionCounters};

/// Resource storing interaction events generated this step
#[derive(Resource, Debug, Default)]
pub struct StepEvents {
    pub events: Vec<InteractionEvent>,
    next_event_id: u64,
}

impl StepEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next event id and buffer the event
    pub fn push(&mut self, mut event: InteractionEvent) {
        self.next_event_id += 1;
        event.event_id = generate_event_id(self.next_event_id);
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Resource: fatal errors raised inside systems, surfaced by the model after
/// the schedule returns
#[derive(Resource, Debug, Default)]
pub struct StepFaults {
    faults: Vec<ModelError>,
}

impl StepFaults {
    pub fn push(&mut self, fault: ModelError) {
        self.faults.push(fault);
    }

    /// First fault of the step, discarding the rest
    pub fn take(&mut self) -> Option<ModelError> {
        let mut faults = std::mem::take(&mut self.faults);
        if faults.is_empty() {
            None
        } else {
            Some(faults.swap_remove(0))
        }
    }
}

/// System: clear every agent's activity flag
pub fn reset_active_flags(mut query: Query<&mut Active>) {
    for mut active in query.iter_mut() {
        active.0 = false;
    }
}

/// System: zero the per-step interaction tallies
pub fn reset_interaction_counters(mut counters: ResMut<InteractionCounters>) {
    counters.reset();
}

/// System: one uniformly chosen agent moves, gathers its group and speaks
pub fn activate_random_agent(
    mut sim_rng: ResMut<SimRng>,
    params: Res<AdvancedParams>,
    population: Res<Population>,
    state: Res<SimulationState>,
    mut grid: ResMut<SpatialGrid>,
    mut events: ResMut<StepEvents>,
    mut agents: Query<(&AgentId, &mut Position, &mut Opinion, &Committed, &mut Active)>,
) {
    let rng = &mut sim_rng.0;
    let Some(&actor) = population.agents().choose(rng) else {
        return;
    };

    if let Some(pos) = relocate(&mut grid, actor, rng) {
        if let Ok((_, mut position, _, _, _)) = agents.get_mut(actor) {
            *position = pos;
        }
    }

    let group = discover_group(&grid, actor, params.groups_size);
    for &member in std::iter::once(&actor).chain(group.iter()) {
        if let Ok((_, _, _, _, mut active)) = agents.get_mut(member) {
            active.0 = true;
        }
    }
    if group.is_empty() {
        return;
    }

    let Ok((speaker_id, _, speaker_opinion, speaker_committed, _)) = agents.get(actor) else {
        return;
    };
    let (speaker_id, speaker_opinion, speaker_committed) =
        (speaker_id.0, *speaker_opinion, speaker_committed.0);

    let mut members = Vec::with_capacity(group.len());
    let mut listeners = Vec::with_capacity(group.len());
    for &entity in &group {
        if let Ok((id, _, opinion, committed, _)) = agents.get(entity) {
            members.push((entity, id.0));
            listeners.push(Listener::new(*opinion, committed.0));
        }
    }

    let result = negotiate(speaker_opinion, speaker_committed, &listeners, params.beta, rng);

    if let Ok((_, _, mut opinion, _, _)) = agents.get_mut(actor) {
        *opinion = result.speaker;
    }
    for (&(entity, _), new_opinion) in members.iter().zip(&result.listeners) {
        if let Ok((_, _, mut opinion, _, _)) = agents.get_mut(entity) {
            *opinion = *new_opinion;
        }
    }

    let listener_ids: Vec<u32> = members.iter().map(|&(_, id)| id).collect();
    let event = match result.outcome {
        NegotiationOutcome::Disagreement { converted } => InteractionEvent::new(
            state.step,
            InteractionKind::Disagreement,
            speaker_id,
            result.word.label(),
        )
        .with_converted(converted as u32),
        NegotiationOutcome::Adopted => {
            debug!(
                step = state.step,
                speaker = speaker_id,
                group = listener_ids.len(),
                word = %result.word,
                "group adopted opinion"
            );
            InteractionEvent::new(
                state.step,
                InteractionKind::Consensus,
                speaker_id,
                result.word.label(),
            )
        }
        NegotiationOutcome::Declined => InteractionEvent::new(
            state.step,
            InteractionKind::ConsensusDeclined,
            speaker_id,
            result.word.label(),
        ),
    };
    events.push(event.with_listeners(listener_ids));
}

/// System: every agent acts once, in a random order
///
/// Spatial mode: move, then listen (clearing `WillListen`) or speak to the
/// cellmate and mark it as the next listener. Randomized mode: speak to a
/// uniformly chosen other agent without moving.
pub fn activate_population(
    mut sim_rng: ResMut<SimRng>,
    params: Res<MinimalParams>,
    population: Res<Population>,
    dictionary: Res<Dictionary>,
    state: Res<SimulationState>,
    mut grid: ResMut<SpatialGrid>,
    mut global: ResMut<GlobalInventory>,
    mut counters: ResMut<InteractionCounters>,
    mut events: ResMut<StepEvents>,
    mut faults: ResMut<StepFaults>,
    mut agents: Query<(&AgentId, &mut Position, &mut Inventory, &mut WillListen, &mut Active)>,
) {
    let rng = &mut sim_rng.0;
    let mut order = population.agents().to_vec();
    order.shuffle(rng);

    for speaker in order {
        let listener = if params.random_interactions {
            match pick_other(population.agents(), speaker, rng) {
                Some(other) => other,
                None => continue,
            }
        } else {
            let Some(pos) = relocate(&mut grid, speaker, rng) else {
                continue;
            };
            let Some(&cellmate) = grid.cell_contents(pos).iter().find(|&&e| e != speaker) else {
                if let Ok((_, mut position, _, _, _)) = agents.get_mut(speaker) {
                    *position = pos;
                }
                continue;
            };
            let Ok((_, mut position, _, mut will_listen, _)) = agents.get_mut(speaker) else {
                continue;
            };
            *position = pos;
            if will_listen.0 {
                will_listen.0 = false;
                continue;
            }
            cellmate
        };

        let Ok([speaker_item, listener_item]) = agents.get_many_mut([speaker, listener]) else {
            continue;
        };
        let (speaker_id, _, mut speaker_inventory, _, mut speaker_active) = speaker_item;
        let (listener_id, _, mut listener_inventory, mut listener_will, mut listener_active) =
            listener_item;

        let exchange = match exchange_words(
            &mut speaker_inventory,
            &mut listener_inventory,
            &mut global,
            &dictionary,
            &mut counters,
            rng,
        ) {
            Ok(exchange) => exchange,
            Err(err) => {
                faults.push(err);
                return;
            }
        };

        if !params.random_interactions {
            listener_will.0 = true;
        }
        speaker_active.0 = true;
        listener_active.0 = true;

        let (speaker_id, listener_id) = (speaker_id.0, listener_id.0);
        if exchange.invented {
            debug!(step = state.step, speaker = speaker_id, word = %exchange.word, "word invented");
            events.push(InteractionEvent::new(
                state.step,
                InteractionKind::WordInvented,
                speaker_id,
                exchange.word.as_str(),
            ));
        }
        let kind = if exchange.converged {
            InteractionKind::Convergence
        } else {
            InteractionKind::WordLearned
        };
        events.push(
            InteractionEvent::new(state.step, kind, speaker_id, exchange.word)
                .with_listeners(vec![listener_id]),
        );
    }
}

/// Uniformly random agent other than `agent`
fn pick_other<R: Rng + ?Sized>(agents: &[Entity], agent: Entity, rng: &mut R) -> Option<Entity> {
    if agents.len() < 2 {
        return None;
    }
    loop {
        let candidate = agents[rng.gen_range(0..agents.len())];
        if candidate != agent {
            return Some(candidate);
        }
    }
}
