//! Engine-level engagement operations that go beyond the plain `EngagementMap`
//! storage type in `skirmish-types`: range propagation, flanking assessment,
//! and the footwork manoeuvre-conflict contest.

use skirmish_types::{canonical_pair, AgentId, Engagement, EngagementAxis, Event, Reach};

use crate::world::World;

/// How many other agents are currently engaged at close-to-medium range with
/// `defender`, excluding `exclude` (typically the attacker being evaluated,
/// since flanking is about *additional* opponents beyond the one you're
/// already facing).
fn close_engagement_count(world: &World, defender: AgentId, exclude: AgentId) -> usize {
    world
        .engagements
        .iter()
        .filter(|((a, b), engagement)| {
            let involves_defender = *a == defender || *b == defender;
            let other = if *a == defender { *b } else { *a };
            involves_defender && other != exclude && engagement.range <= Reach::Spear
        })
        .count()
}

/// Flanking status derived from how many other opponents are simultaneously
/// engaged with `defender` at fighting range. Zero extra opponents: not
/// flanked. One: partial (the `Flanked` condition). Two or more: `Surrounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlankingStatus {
    None,
    Flanked,
    Surrounded,
}

pub fn flanking_status(world: &World, defender: AgentId, attacker: AgentId) -> FlankingStatus {
    match close_engagement_count(world, defender, attacker) {
        0 => FlankingStatus::None,
        1 => FlankingStatus::Flanked,
        _ => FlankingStatus::Surrounded,
    }
}

/// Applies a range change to the `agent`/`other` pair, or to every pair
/// `agent` participates in when `propagate` is set (a footwork play that
/// changes the whole engagement, not just the one it was aimed at).
pub fn modify_range(world: &mut World, agent: AgentId, other: Option<AgentId>, steps: i32, propagate: bool) {
    if propagate {
        let partners: Vec<AgentId> = world
            .engagements
            .iter()
            .filter_map(|((a, b), _)| {
                if *a == agent {
                    Some(*b)
                } else if *b == agent {
                    Some(*a)
                } else {
                    None
                }
            })
            .collect();
        for partner in partners {
            step_range(world, agent, partner, steps);
        }
    } else if let Some(other) = other {
        step_range(world, agent, other, steps);
    }
}

fn step_range(world: &mut World, a: AgentId, b: AgentId, steps: i32) {
    if let Some(engagement) = world.engagements.get_mut(&a, &b) {
        engagement.range = engagement.range.step(steps);
    }
}

/// Nudges one advantage axis by `delta`, clamping to `[-1, 1]`, and emits
/// `AdvantageChanged` with the pre/post values.
pub fn modify_engagement_axis(
    world: &mut World,
    agent: AgentId,
    other: AgentId,
    axis: EngagementAxis,
    delta: f32,
) {
    let default_range = world.engagements.get(&agent, &other).map(|e| e.range).unwrap_or(Reach::Medium);
    // `balance_a`/`balance_b` are keyed to the canonicalised pair, not to
    // whichever argument order the caller used — resolve which side `agent`
    // occupies in storage before reading or writing its balance value.
    let (first, _) = canonical_pair(&agent, &other);
    let is_first = first == agent;
    let engagement = world.engagements.entry_or_neutral(&agent, &other, default_range);
    let old = axis_value(engagement, axis, is_first);
    set_axis_value(engagement, axis, is_first, old + delta);
    engagement.clamp_axes();
    let new = axis_value(engagement, axis, is_first);
    world.events.emit(Event::AdvantageChanged { agent_id: agent, axis, old, new });
}

fn axis_value(e: &Engagement, axis: EngagementAxis, is_first: bool) -> f32 {
    match axis {
        EngagementAxis::Pressure => e.pressure,
        EngagementAxis::Control => e.control,
        EngagementAxis::Position => e.position,
        EngagementAxis::Balance => {
            if is_first {
                e.balance_a
            } else {
                e.balance_b
            }
        }
    }
}

fn set_axis_value(e: &mut Engagement, axis: EngagementAxis, is_first: bool, value: f32) {
    match axis {
        EngagementAxis::Pressure => e.pressure = value,
        EngagementAxis::Control => e.control = value,
        EngagementAxis::Position => e.position = value,
        EngagementAxis::Balance => {
            if is_first {
                e.balance_a = value;
            } else {
                e.balance_b = value;
            }
        }
    }
}

/// Score inputs for a manoeuvre contest: `speed`/`position`/`balance` are
/// agent-derived stats in `[0, 1]`-ish range (the caller supplies them, since
/// "speed" isn't itself a stored field — it's read off whatever stat block
/// backs the agent), `footwork_mult` is the condition-penalty row's
/// multiplier already aggregated for that agent this tick.
#[derive(Debug, Clone, Copy)]
pub struct ManoeuvreInputs {
    pub speed: f32,
    pub position: f32,
    pub balance: f32,
    pub footwork_mult: f32,
    /// `true` if the agent's play this tick doesn't actually change range
    /// (e.g. holding ground) — standing still always yields a negative score.
    pub standing_still: bool,
}

pub fn manoeuvre_score(inputs: ManoeuvreInputs) -> f32 {
    if inputs.standing_still {
        return -1.0;
    }
    (0.3 * inputs.speed + 0.4 * inputs.position + 0.3 * inputs.balance) * inputs.footwork_mult
}

/// Resolves a contest between two overlapping footwork plays that both
/// advertise a range change. Higher score wins and their range change
/// applies; on an exact tie neither's does (stalemate).
pub fn resolve_manoeuvre_conflict(a: ManoeuvreInputs, b: ManoeuvreInputs) -> Option<bool> {
    let score_a = manoeuvre_score(a);
    let score_b = manoeuvre_score(b);
    if (score_a - score_b).abs() < f32::EPSILON {
        None
    } else {
        Some(score_a > score_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manoeuvre_tie_is_stalemate() {
        let inputs = ManoeuvreInputs { speed: 0.5, position: 0.5, balance: 0.5, footwork_mult: 1.0, standing_still: false };
        assert_eq!(resolve_manoeuvre_conflict(inputs, inputs), None);
    }

    #[test]
    fn standing_still_always_loses() {
        let mover = ManoeuvreInputs { speed: 0.1, position: 0.1, balance: 0.1, footwork_mult: 1.0, standing_still: false };
        let still = ManoeuvreInputs { speed: 1.0, position: 1.0, balance: 1.0, footwork_mult: 1.0, standing_still: true };
        assert_eq!(resolve_manoeuvre_conflict(mover, still), Some(true));
    }

    #[test]
    fn flanking_none_with_only_the_attacker_engaged() {
        let mut world = World::new(1);
        let defender = world.agents.insert(test_agent());
        let attacker = world.agents.insert(test_agent());
        world.engagements.set(&defender, &attacker, Engagement::neutral(Reach::Sabre));
        assert_eq!(flanking_status(&world, defender, attacker), FlankingStatus::None);
    }

    #[test]
    fn flanking_surrounded_with_two_other_close_opponents() {
        let mut world = World::new(1);
        let defender = world.agents.insert(test_agent());
        let attacker = world.agents.insert(test_agent());
        let extra1 = world.agents.insert(test_agent());
        let extra2 = world.agents.insert(test_agent());
        world.engagements.set(&defender, &attacker, Engagement::neutral(Reach::Sabre));
        world.engagements.set(&defender, &extra1, Engagement::neutral(Reach::Dagger));
        world.engagements.set(&defender, &extra2, Engagement::neutral(Reach::Clinch));
        assert_eq!(flanking_status(&world, defender, attacker), FlankingStatus::Surrounded);
    }

    fn test_agent() -> skirmish_types::Agent {
        use skirmish_types::*;
        Agent {
            id: AgentId::new(0, 0),
            body: Body { parts: vec![], wounds: vec![] },
            resources: Resources {
                stamina: ResourcePool::new(10.0, 2.0),
                focus: ResourcePool::new(3.0, 1.0),
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
            active_conditions: vec![],
            reaction_slot: None,
        }
    }
}
