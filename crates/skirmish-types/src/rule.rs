//! The rule/predicate/effect grammar that drives every card's behaviour.
//!
//! Card behaviour is data, not code: the interpreter in `skirmish-engine`
//! walks this tagged-variant tree once and applies the same evaluation path
//! to every card. Adding a behaviour adds a variant here, never a new
//! dispatch path in the interpreter.

use serde::{Deserialize, Serialize};

use crate::enums::{CardTags, ComparisonOp, Condition, EngagementAxis};
use crate::ids::{CardId, TechniqueId};
use crate::registry::AgentId;

/// Tag on an `on_event` trigger/predicate — identifies which emitted event
/// a rule reacts to, independent of the full `Event` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    WoundInflicted,
    BodyPartSevered,
    HitMajorArtery,
    ArmourDeflected,
    ArmourAbsorbed,
    ArmourLayerDestroyed,
    AttackFoundGap,
    TechniqueResolved,
    AdvantageChanged,
    CardMoved,
    ConditionGained,
    ConditionExpired,
    MobDied,
}

/// When a rule is considered for firing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    OnPlay,
    OnDraw,
    OnTick,
    OnCommit,
    OnResolve,
    OnEvent { tag: EventTag },
    WhileInHand,
    OnPlayAttempt,
}

/// Recursive boolean predicate tree evaluated against a `RuleContext`.
/// Missing context pieces (no engagement, no event) evaluate the relevant
/// leaf as `false` rather than erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    Always,
    HasTag { mask: CardTags },
    WeaponCategory { category: String },
    WeaponReach { op: ComparisonOp, value: f32 },
    Range { op: ComparisonOp, value: f32 },
    AdvantageThreshold {
        axis: EngagementAxis,
        op: ComparisonOp,
        value: f32,
    },
    HasCondition { condition: Condition },
    HasEquipped { filter: String },
    MyPlay { inner: Box<Predicate> },
    OpponentPlay { inner: Box<Predicate> },
    EventCondition { tag: EventTag },
    CardHasTag { mask: CardTags },
    Not { inner: Box<Predicate> },
    All { inner: Vec<Predicate> },
    Any { inner: Vec<Predicate> },
}

impl Predicate {
    pub fn not(self) -> Predicate {
        Predicate::Not { inner: Box::new(self) }
    }
}

/// Where an expression's effect should be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetQuery {
    SelfTarget,
    Single { predicate: Box<Predicate> },
    AllEnemies,
    AllInRange,
    Focal,
    EventSource,
    EquippedItem { filter: String },
    /// The acting agent's own instance of the first card in `zone` whose
    /// template id contains `filter` — the `EquippedItem` pattern
    /// generalised to any per-agent zone, used by rules that act on a card
    /// other than the one carrying the rule (e.g. a permanent reflex dealing
    /// a dud out of discard and into hand).
    ZonedCard { zone: crate::enums::Zone, filter: String },
    MyPlay { predicate: Box<Predicate> },
    OpponentPlay { predicate: Box<Predicate> },
    Engagement,
    FocalEngagement,
}

// `Predicate` derives `PartialEq` but not `Eq` (it has no float leaves that
// would break reflexivity beyond IEEE NaN, which rule data never produces).
impl Eq for Predicate {}

/// A card's effect — the sum type every expression ultimately executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    CombatTechnique { technique: TechniqueId },
    ModifyPlay {
        cost_mult: Option<f32>,
        damage_mult: Option<f32>,
        replace_advantage: Option<f32>,
    },
    CancelPlay,
    ModifyRange { steps: i32, propagate: bool },
    ModifyEngagement { axis: EngagementAxis, delta: f32 },
    AddCondition { condition: Condition, duration: Option<u32> },
    RemoveCondition { condition: Condition },
    ResourceDelta { resource: crate::enums::Resource, delta: i32 },
    MoveCard { to: crate::enums::Zone },
    ExhaustCard,
    ThrowEquipped { filter: String },
    EmitEvent { tag: EventTag },
    ModifyOverlappingPlay { damage_mult: f32 },
}

impl Eq for Effect {}

/// One `{effect, target_query, filter}` entry within a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub effect: Effect,
    pub target_query: TargetQuery,
    /// Additional per-candidate filter, applied after `target_query`
    /// resolves its candidate list.
    pub filter: Option<Predicate>,
}

/// `{trigger, predicate, expressions[]}` — one behaviour entry on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub trigger: Trigger,
    pub predicate: Predicate,
    pub expressions: Vec<Expression>,
}

/// Errors surfaced by expression-level effect execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("no valid target for expression")]
    InvalidTarget,
    #[error("insufficient resources to fire rule")]
    InsufficientResources,
    #[error("rule not permitted in current phase")]
    WrongPhase,
}

/// Context passed into `fire_rules` — who is acting, on behalf of which
/// card, against which (optional) target, with which engagement reference.
#[derive(Debug, Clone)]
pub struct RuleContext {
    pub acting_agent: AgentId,
    pub originating_card: CardId,
    pub target: Option<AgentId>,
    pub event_tag: Option<EventTag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_not_wraps() {
        let p = Predicate::Always.not();
        assert_eq!(p, Predicate::Not { inner: Box::new(Predicate::Always) });
    }
}
