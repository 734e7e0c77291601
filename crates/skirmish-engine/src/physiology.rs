//! Physiology tick — executed at the end of `apply_effects`. Bleeding drains
//! blood, new wounds accumulate pain/trauma, adrenaline lifecycles advance,
//! and resource-threshold conditions get (re-)injected.

use skirmish_data::condition_penalties::on_expire;
use skirmish_types::{AgentId, Condition, Event, Expiration, Severity, Wound};

use crate::world::World;

/// Base pain/trauma accumulated per wound, indexed by the part's post-hit
/// severity. `severity_base` mirrors the bleeding-rate severity factor table
/// (0.2 -> 1.0 across the five damaged steps) since both scale with how
/// badly the part was hurt.
fn severity_base(severity: Severity) -> f32 {
    match severity {
        Severity::None => 0.0,
        Severity::Minor => 0.2,
        Severity::Inhibited => 0.4,
        Severity::Disabled => 0.6,
        Severity::Broken => 0.8,
        Severity::Missing => 1.0,
    }
}

/// Runs the physiology tick for every agent with a combat state. Returns the
/// number of agents whose blood hit zero this tick (each already emitted
/// `mob_died` exactly once internally).
pub fn run_physiology_tick(world: &mut World, new_wounds_this_tick: &std::collections::HashMap<AgentId, Vec<Wound>>) -> usize {
    let ids = world.agent_ids();
    let mut deaths = 0;
    for agent_id in ids {
        if tick_agent(world, agent_id, new_wounds_this_tick.get(&agent_id).map(|w| w.as_slice()).unwrap_or(&[])) {
            deaths += 1;
        }
    }
    deaths
}

fn tick_agent(world: &mut World, agent_id: AgentId, new_wounds: &[Wound]) -> bool {
    let Some(agent) = world.agent_mut(agent_id) else { return false };

    // 1. Bleeding drain.
    let bleed_total: f32 = agent.body.wounds.iter().map(|w| w.bleeding_rate).sum();
    let was_alive = agent.resources.blood.current > 0.0;
    agent.resources.blood.current = (agent.resources.blood.current - bleed_total).max(0.0);

    // 2. Pain/trauma accumulation from this tick's new wounds.
    for wound in new_wounds {
        let part = &agent.body.parts[wound.part_index];
        let base = severity_base(part.severity);
        let delta = base * part.trauma_mult;
        agent.resources.pain = (agent.resources.pain + delta).min(1.0);
        let trauma_bonus = if wound.artery_hit { 0.2 } else { 0.0 };
        agent.resources.trauma = (agent.resources.trauma + delta + trauma_bonus).min(1.0);
    }

    // 3. Adrenaline lifecycle.
    let has_severe_wound = new_wounds.iter().any(|w| {
        let part = &agent.body.parts[w.part_index];
        part.severity >= Severity::Inhibited
    });
    let already_surging = agent.has_condition(Condition::AdrenalineSurge);
    if has_severe_wound && !already_surging {
        agent.active_conditions.push(skirmish_types::ActiveCondition {
            condition: Condition::AdrenalineSurge,
            expiration: Expiration::Ticks(5),
        });
        world.events.emit(Event::ConditionGained { agent_id, tag: skirmish_types::EventTag::ConditionGained });
    }
    expire_conditions(world, agent_id);

    // 4. Condition injection for resource thresholds is handled by the
    // condition iterator on demand — nothing to mutate here beyond what's
    // already stored above.

    // 5. Dud injection: the `condition_gained` event emitted above is
    // dispatched to cards in `techniques_known`/hand by the scheduler's
    // `run_apply_effects`, once this whole tick's physiology has settled.

    let agent = world.agent(agent_id).unwrap();
    let incapacitated = agent.resources.pain >= 0.95 || agent.resources.trauma >= 0.95;
    if incapacitated && !agent.has_condition(Condition::Incapacitated) {
        world.agent_mut(agent_id).unwrap().active_conditions.push(skirmish_types::ActiveCondition {
            condition: Condition::Incapacitated,
            expiration: Expiration::Dynamic,
        });
    }

    let blood_zero = world.agent(agent_id).unwrap().resources.blood.current <= 0.0;
    if blood_zero && was_alive {
        world.events.emit(Event::MobDied { agent_id });
        return true;
    }
    false
}

/// Decrements ticked (non-dynamic) condition timers, expiring any that hit
/// zero and transitioning ones with an `on_expire` mapping (adrenaline surge
/// -> crash) instead of simply dropping them.
fn expire_conditions(world: &mut World, agent_id: AgentId) {
    let Some(agent) = world.agent_mut(agent_id) else { return };
    let mut expired = Vec::new();
    let mut transitioned = Vec::new();
    agent.active_conditions.retain_mut(|active| match active.expiration {
        Expiration::Dynamic => true,
        Expiration::Ticks(0) => {
            expired.push(active.condition);
            if let Some(next) = on_expire(active.condition) {
                transitioned.push(next);
            }
            false
        }
        Expiration::Ticks(n) => {
            active.expiration = Expiration::Ticks(n - 1);
            true
        }
    });
    for condition in transitioned {
        agent.active_conditions.push(skirmish_types::ActiveCondition { condition, expiration: Expiration::Ticks(5) });
    }
    for _condition in expired {
        world.events.emit(Event::ConditionExpired { agent_id, tag: skirmish_types::EventTag::ConditionExpired });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_types::*;

    fn agent_with_blood(blood_max: f32, blood_current: f32) -> Agent {
        Agent {
            id: AgentId::new(0, 0),
            body: Body { parts: vec![torso()], wounds: vec![] },
            resources: Resources {
                stamina: ResourcePool::new(10.0, 2.0),
                focus: ResourcePool::new(3.0, 1.0),
                blood: ResourcePool { current: blood_current, reserved: 0.0, max: blood_max, per_turn: 0.0 },
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
            active_conditions: vec![],
            reaction_slot: None,
        }
    }

    fn torso() -> Part {
        Part {
            tag: PartTag::Torso,
            side: Side::Centre,
            parent: None,
            can_grasp: false,
            can_stand: true,
            can_see: false,
            can_hear: false,
            tissue: vec![LayerState { layer: TissueLayer::Skin, integrity: 1.0 }],
            severity: Severity::Broken,
            has_artery: true,
            trauma_mult: 1.0,
        }
    }

    #[test]
    fn bleeding_fatality_emits_mob_died_once() {
        let mut world = World::new(1);
        let id = world.agents.insert(agent_with_blood(5.0, 0.5));
        world.agent_mut(id).unwrap().body.wounds.push(Wound {
            kind: WoundKind::Slash,
            part_index: 0,
            deepest_layer_index: 0,
            bleeding_rate: 0.5,
            artery_hit: true,
        });
        let empty = std::collections::HashMap::new();
        run_physiology_tick(&mut world, &empty);
        assert_eq!(world.agent(id).unwrap().resources.blood.current, 0.0);
        assert_eq!(world.events.current().iter().filter(|e| matches!(e, Event::MobDied { .. })).count(), 1);

        // A second tick at zero blood must not re-emit mob_died.
        world.events.swap();
        run_physiology_tick(&mut world, &empty);
        assert!(!world.events.current().iter().any(|e| matches!(e, Event::MobDied { .. })));
    }

    #[test]
    fn new_severe_wound_triggers_adrenaline_surge() {
        let mut world = World::new(1);
        let id = world.agents.insert(agent_with_blood(5.0, 5.0));
        let mut wounds = std::collections::HashMap::new();
        wounds.insert(
            id,
            vec![Wound { kind: WoundKind::Pierce, part_index: 0, deepest_layer_index: 0, bleeding_rate: 0.0, artery_hit: false }],
        );
        run_physiology_tick(&mut world, &wounds);
        assert!(world.agent(id).unwrap().has_condition(Condition::AdrenalineSurge));
    }
}
