//! `World` — the single mutable value every phase transition mutates through
//! an exclusive reference. Read-only paths (snapshot building, predicate
//! evaluation) take a shared reference instead. No process-wide state: an
//! encounter's entire lifetime is scoped to one `World`, dropped wholesale on
//! teardown.

use std::collections::HashMap;

use skirmish_types::{
    Agent, AgentId, AgentMarker, CardInstance, CardInstanceId, CardInstanceMarker, CombatOutcome,
    EngagementMap, EnvironmentZone, RngStreams, Wound,
};

use crate::events::EventBus;
use crate::registry::EntityRegistry;

/// Scheduler FSM states. `EncounterSummary` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    DrawHand,
    PlayerCardSelection,
    CommitPhase,
    TickResolution,
    ApplyEffects,
    Advance,
    EncounterSummary(CombatOutcome),
}

/// Out-of-band bookkeeping for the current commit phase: focus already spent
/// on commit-phase adjustments (withdraw/add/stack each cost 1 focus, except
/// the first stack of reinforcements onto a play is free — tracked per play
/// index) and any repositioning cost recorded outside the resource pool.
#[derive(Debug, Clone, Default)]
pub struct TurnState {
    /// Play indices (per-agent) that have already had one reinforcement
    /// stacked onto them this commit phase — the first stack is focus-priced,
    /// subsequent stacks on the same play are free.
    pub stacked_plays: std::collections::BTreeSet<(AgentId, usize)>,
}

/// The entire mutable world for one encounter.
pub struct World {
    pub agents: EntityRegistry<Agent, AgentMarker>,
    pub card_instances: EntityRegistry<CardInstance, CardInstanceMarker>,
    pub engagements: EngagementMap,
    pub environment: EnvironmentZone,
    pub rng: RngStreams,
    pub events: EventBus,
    pub phase: Phase,
    pub tick: u64,
    pub turn_state: TurnState,
    /// Wounds inflicted during this tick's `TickResolution`, carried over to
    /// `ApplyEffects` for the physiology tick. Drained at the start of every
    /// `ApplyEffects` run.
    pub pending_wounds: HashMap<AgentId, Vec<Wound>>,
}

impl World {
    pub fn new(seed: u32) -> Self {
        Self {
            agents: EntityRegistry::new(),
            card_instances: EntityRegistry::new(),
            engagements: EngagementMap::new(),
            environment: EnvironmentZone::new(),
            rng: RngStreams::new(seed),
            events: EventBus::new(),
            phase: Phase::DrawHand,
            tick: 0,
            turn_state: TurnState::default(),
            pending_wounds: HashMap::new(),
        }
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn card_instance(&self, id: CardInstanceId) -> Option<&CardInstance> {
        self.card_instances.get(id)
    }

    /// All currently-registered agent ids, in arena order (stable for a
    /// given `World`), used wherever a deterministic scan over encounter
    /// participants is needed.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|(id, _)| id).collect()
    }
}
