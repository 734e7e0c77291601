//! The agent: body, resource pools, physiological accumulators, and the
//! optional per-encounter combat state.

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::enums::{Condition, DrawStyle, Side};
use crate::ids::{ArmourId, WeaponId};
use crate::registry::{AgentId, CardInstanceId};
use crate::zone::ZoneSet;

/// A tracked resource pool: `reserved <= current <= max`, refilled by
/// `per_turn` at draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub current: f32,
    pub reserved: f32,
    pub max: f32,
    pub per_turn: f32,
}

impl ResourcePool {
    pub fn new(max: f32, per_turn: f32) -> Self {
        Self { current: max, reserved: 0.0, max, per_turn }
    }

    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    /// `true` iff the invariant `reserved <= current <= max` holds.
    pub fn invariant_holds(&self) -> bool {
        self.reserved <= self.current + f32::EPSILON && self.current <= self.max + f32::EPSILON
    }
}

/// The three tracked resource pools plus the physiological accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub stamina: ResourcePool,
    pub focus: ResourcePool,
    pub blood: ResourcePool,
    pub pain: f32,
    pub trauma: f32,
    pub morale: f32,
}

/// Per-encounter combat state: the agent's current zones, equipped slots,
/// and the tick timeline. Created when entering an encounter, torn down on
/// exit (exhausted cards un-exhaust and discard merges back into
/// `deck_cards` conceptually — the `deck_cards` ids themselves never leave
/// the agent; transient zones only ever hold copies of those ids).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatState {
    pub zones: ZoneSet,
    pub timeline: crate::timeline::Timeline,
    pub equipped_weapon: Option<WeaponId>,
    pub equipped_armour: Vec<ArmourId>,
    pub primary_target: Option<AgentId>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One active condition and when it expires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveCondition {
    pub condition: Condition,
    pub expiration: Expiration,
}

/// `dynamic` for computed conditions (re-derived every iteration), or an
/// explicit remaining tick count for stored ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expiration {
    Dynamic,
    Ticks(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub body: Body,
    pub resources: Resources,
    pub dominant_side: Side,
    pub draw_style: DrawStyle,
    pub deck_cards: Vec<CardInstanceId>,
    pub techniques_known: Vec<CardInstanceId>,
    pub spells_known: Vec<CardInstanceId>,
    pub inventory: Vec<CardInstanceId>,
    pub combat: Option<CombatState>,
    pub active_conditions: Vec<ActiveCondition>,
    pub reaction_slot: Option<CardInstanceId>,
}

impl Agent {
    pub fn has_condition(&self, condition: Condition) -> bool {
        self.active_conditions.iter().any(|c| c.condition == condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_invariant_holds_at_construction() {
        let r = ResourcePool::new(10.0, 2.0);
        assert!(r.invariant_holds());
        assert_eq!(r.ratio(), 1.0);
    }

    #[test]
    fn resource_invariant_detects_violation() {
        let mut r = ResourcePool::new(10.0, 2.0);
        r.reserved = 11.0;
        assert!(!r.invariant_holds());
    }

    #[test]
    fn resource_pool_stays_ordered_through_reserve_and_spend() {
        use proptest::prelude::*;
        proptest!(|(max in 1.0f32..50.0, per_turn in 0.0f32..10.0, reserve in 0.0f32..50.0, spend in 0.0f32..50.0)| {
            let mut pool = ResourcePool::new(max, per_turn);
            let reserve = reserve.min(pool.current);
            pool.reserved += reserve;
            prop_assert!(pool.invariant_holds());
            let spend = spend.min(pool.current - pool.reserved);
            pool.current -= spend;
            prop_assert!(pool.invariant_holds());
        });
    }

    #[test]
    fn has_condition_checks_active_list() {
        let agent = Agent {
            id: AgentId::new(0, 0),
            body: Body { parts: vec![], wounds: vec![] },
            resources: Resources {
                stamina: ResourcePool::new(10.0, 2.0),
                focus: ResourcePool::new(5.0, 1.0),
                blood: ResourcePool::new(5.0, 0.0),
                pain: 0.0,
                trauma: 0.0,
                morale: 1.0,
            },
            dominant_side: Side::Right,
            draw_style: DrawStyle::ShuffledDeck,
            deck_cards: vec![],
            techniques_known: vec![],
            spells_known: vec![],
            inventory: vec![],
            combat: None,
            active_conditions: vec![ActiveCondition {
                condition: Condition::Blinded,
                expiration: Expiration::Dynamic,
            }],
            reaction_slot: None,
        };
        assert!(agent.has_condition(Condition::Blinded));
        assert!(!agent.has_condition(Condition::Deafened));
    }
}
