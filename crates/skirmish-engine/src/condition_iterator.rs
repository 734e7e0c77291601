//! The computed-condition iterator: merges an agent's stored conditions with
//! ones derived on the fly from physiology and engagement, in a fixed
//! priority order. Two successive calls over an unchanged world yield an
//! identical sequence — nothing here consumes RNG or mutates anything.

use skirmish_types::{Agent, AgentId, Condition, Expiration};
use skirmish_data::condition_penalties::{BLOOD_BANDS, RESOURCE_THRESHOLDS};

use crate::engagement_ops::{flanking_status, FlankingStatus};
use crate::world::World;

/// One condition as yielded by the iterator, with its expiration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldedCondition {
    pub condition: Condition,
    pub expiration: Expiration,
}

/// Threshold for both pain-ratio and trauma-ratio incapacitation.
pub const INCAPACITATION_RATIO: f32 = 0.95;

/// Priority order from section 4.7:
/// 1. incapacitation, 2. stored explicit conditions, 3. computed balance,
/// 4. blood-loss band, 5. sensory, 6. engagement pressure/control,
/// 7. resource-threshold conditions (pain/trauma table, worst-first).
///
/// `relative_to` is the specific opponent engagement-derived conditions
/// (balance, flanking, pressure/control) are computed against — `None` skips
/// those bands entirely (no engagement to read), matching "missing context
/// pieces evaluate false" from the predicate-evaluation rule.
pub fn iterate(world: &World, agent_id: AgentId, relative_to: Option<AgentId>) -> Vec<YieldedCondition> {
    let Some(agent) = world.agent(agent_id) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let mut push = |out: &mut Vec<YieldedCondition>, seen: &mut std::collections::HashSet<Condition>, c: YieldedCondition| {
        if seen.insert(c.condition) {
            out.push(c);
        }
    };

    // 1. Incapacitation.
    if is_incapacitated(agent) {
        push(&mut out, &mut seen, YieldedCondition { condition: Condition::Incapacitated, expiration: Expiration::Dynamic });
    }

    // 2. Stored explicit conditions, suppressing pain-family conditions
    // while adrenaline surge masks them.
    let surging = agent.has_condition(Condition::AdrenalineSurge);
    for stored in &agent.active_conditions {
        if surging && matches!(stored.condition, Condition::Pain | Condition::Trauma) {
            continue;
        }
        push(&mut out, &mut seen, YieldedCondition { condition: stored.condition, expiration: stored.expiration });
    }

    if let Some(other) = relative_to {
        if let Some(engagement) = world.engagements.get(&agent_id, &other) {
            // 3. Computed balance.
            let (first, _) = skirmish_types::canonical_pair(&agent_id, &other);
            let my_balance = if first == agent_id { engagement.balance_a } else { engagement.balance_b };
            if my_balance < -0.5 {
                push(&mut out, &mut seen, YieldedCondition { condition: Condition::Controlled, expiration: Expiration::Dynamic });
            }

            // 6. Engagement pressure/control thresholds (checked here so the
            // engagement reference is already in scope; still emitted after
            // blood/sensory below per the priority order).
            let pressure_flag = engagement.pressure < -0.5;
            let control_flag = engagement.control < -0.5;

            // flanking is itself engagement-derived.
            match flanking_status(world, agent_id, other) {
                FlankingStatus::Surrounded => {
                    push(&mut out, &mut seen, YieldedCondition { condition: Condition::Surrounded, expiration: Expiration::Dynamic });
                }
                FlankingStatus::Flanked => {
                    push(&mut out, &mut seen, YieldedCondition { condition: Condition::Flanked, expiration: Expiration::Dynamic });
                }
                FlankingStatus::None => {}
            }

            // 4. Blood-loss band.
            push_blood_band(agent, &mut out, &mut seen);
            // 5. Sensory.
            push_sensory(agent, &mut out, &mut seen);

            if pressure_flag {
                push(&mut out, &mut seen, YieldedCondition { condition: Condition::Pressured, expiration: Expiration::Dynamic });
            }
            if control_flag {
                push(&mut out, &mut seen, YieldedCondition { condition: Condition::Controlled, expiration: Expiration::Dynamic });
            }
        } else {
            push_blood_band(agent, &mut out, &mut seen);
            push_sensory(agent, &mut out, &mut seen);
        }
    } else {
        push_blood_band(agent, &mut out, &mut seen);
        push_sensory(agent, &mut out, &mut seen);
    }

    // 7. Resource-threshold conditions, worst-first per resource, one per
    // resource (the table is already ordered worst-first; take the first
    // match per resource).
    let mut handled_resources = std::collections::HashSet::new();
    for &(resource, min_ratio, condition) in RESOURCE_THRESHOLDS {
        if handled_resources.contains(&resource) {
            continue;
        }
        let ratio = match resource {
            skirmish_types::Resource::Stamina => agent.resources.stamina.ratio(),
            skirmish_types::Resource::Focus => agent.resources.focus.ratio(),
        };
        if ratio <= min_ratio {
            push(&mut out, &mut seen, YieldedCondition { condition, expiration: Expiration::Dynamic });
            handled_resources.insert(resource);
        }
    }

    out
}

fn is_incapacitated(agent: &Agent) -> bool {
    let pain_ratio = if agent.resources.pain <= 0.0 { 0.0 } else { agent.resources.pain };
    let trauma_ratio = if agent.resources.trauma <= 0.0 { 0.0 } else { agent.resources.trauma };
    pain_ratio >= INCAPACITATION_RATIO || trauma_ratio >= INCAPACITATION_RATIO
}

fn push_blood_band(agent: &Agent, out: &mut Vec<YieldedCondition>, seen: &mut std::collections::HashSet<Condition>) {
    let ratio = agent.resources.blood.ratio();
    for &(band, condition) in BLOOD_BANDS {
        if ratio < band {
            if seen.insert(condition) {
                out.push(YieldedCondition { condition, expiration: Expiration::Dynamic });
            }
            return;
        }
    }
}

fn push_sensory(agent: &Agent, out: &mut Vec<YieldedCondition>, seen: &mut std::collections::HashSet<Condition>) {
    if agent.body.vision_score() < 0.3 && seen.insert(Condition::Blinded) {
        out.push(YieldedCondition { condition: Condition::Blinded, expiration: Expiration::Dynamic });
    }
    if agent.body.hearing_score() < 0.3 && seen.insert(Condition::Deafened) {
        out.push(YieldedCondition { condition: Condition::Deafened, expiration: Expiration::Dynamic });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_types::*;

    fn agent_with(pain: f32, trauma: f32, blood_ratio: f32) -> Agent {
        Agent {
            id: AgentId::new(0, 0),
            body: Body { parts: vec![], wounds: vec![] },
            resources: Resources {
                stamina: ResourcePool::new(10.0, 2.0),
                focus: ResourcePool::new(3.0, 1.0),
                blood: ResourcePool { current: 5.0 * blood_ratio, reserved: 0.0, max: 5.0, per_turn: 0.0 },
                pain,
                trauma,
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

    #[test]
    fn incapacitated_at_exactly_95_percent_pain() {
        let mut world = World::new(1);
        let id = world.agents.insert(agent_with(0.95, 0.0, 1.0));
        let yielded = iterate(&world, id, None);
        assert!(yielded.iter().any(|c| c.condition == Condition::Incapacitated));
    }

    #[test]
    fn below_incapacitation_threshold_not_yielded() {
        let mut world = World::new(1);
        let id = world.agents.insert(agent_with(0.94, 0.0, 1.0));
        let yielded = iterate(&world, id, None);
        assert!(!yielded.iter().any(|c| c.condition == Condition::Incapacitated));
    }

    #[test]
    fn idempotent_across_two_calls() {
        let mut world = World::new(1);
        let id = world.agents.insert(agent_with(0.5, 0.2, 0.7));
        assert_eq!(iterate(&world, id, None), iterate(&world, id, None));
    }

    #[test]
    fn low_blood_yields_hypovolemic_shock() {
        let mut world = World::new(1);
        let id = world.agents.insert(agent_with(0.0, 0.0, 0.3));
        let yielded = iterate(&world, id, None);
        assert!(yielded.iter().any(|c| c.condition == Condition::HypovolemicShock));
    }

    #[test]
    fn adrenaline_surge_suppresses_pain_condition() {
        let mut world = World::new(1);
        let mut agent = agent_with(0.5, 0.0, 1.0);
        agent.active_conditions.push(ActiveCondition { condition: Condition::AdrenalineSurge, expiration: Expiration::Ticks(3) });
        agent.active_conditions.push(ActiveCondition { condition: Condition::Pain, expiration: Expiration::Ticks(2) });
        let id = world.agents.insert(agent);
        let yielded = iterate(&world, id, None);
        assert!(yielded.iter().any(|c| c.condition == Condition::AdrenalineSurge));
        assert!(!yielded.iter().any(|c| c.condition == Condition::Pain));
    }
}
