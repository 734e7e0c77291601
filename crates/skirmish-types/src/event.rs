//! Semantic events emitted to the double-buffered event bus. External
//! collaborators (the frontend, the combat log) consume the current buffer
//! after a phase completes and before the engine swaps to the next tick's.

use serde::{Deserialize, Serialize};

use crate::body::Wound;
use crate::enums::{EngagementAxis, PartTag, Side, Zone};
use crate::registry::AgentId;
use crate::rule::EventTag;

/// The outcome of a resolved technique pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueOutcome {
    Miss,
    Parry,
    Deflect,
    Block,
    Glance,
    CleanHit,
}

/// Why an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    Victory,
    Defeat,
    Flee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    WoundInflicted {
        agent_id: AgentId,
        wound: Wound,
        part_tag: PartTag,
        side: Side,
    },
    BodyPartSevered {
        agent_id: AgentId,
        part_tag: PartTag,
        side: Side,
    },
    HitMajorArtery {
        agent_id: AgentId,
        part_tag: PartTag,
    },
    ArmourDeflected {
        agent_id: AgentId,
        part_tag: PartTag,
        layer_index: usize,
    },
    ArmourAbsorbed {
        agent_id: AgentId,
        part_tag: PartTag,
        layer_index: usize,
    },
    ArmourLayerDestroyed {
        agent_id: AgentId,
        part_tag: PartTag,
        layer_index: usize,
    },
    AttackFoundGap {
        agent_id: AgentId,
        part_tag: PartTag,
    },
    TechniqueResolved {
        attacker_id: AgentId,
        defender_id: AgentId,
        outcome: TechniqueOutcome,
    },
    AdvantageChanged {
        agent_id: AgentId,
        axis: EngagementAxis,
        old: f32,
        new: f32,
    },
    CardMoved {
        actor: AgentId,
        from: Zone,
        to: Zone,
    },
    StaminaDeducted {
        agent_id: AgentId,
        amount: f32,
    },
    MobDied {
        agent_id: AgentId,
    },
    GameStateTransitionedTo {
        phase: String,
    },
    CombatEnded {
        outcome: CombatOutcome,
    },
    ConditionGained {
        agent_id: AgentId,
        tag: EventTag,
    },
    ConditionExpired {
        agent_id: AgentId,
        tag: EventTag,
    },
    /// A domain invariant violation was caught and the current tick was
    /// aborted; pending effects for the tick were discarded. Emitted instead
    /// of panicking so external collaborators see it like any other event.
    InvariantViolated {
        message: String,
    },
}
