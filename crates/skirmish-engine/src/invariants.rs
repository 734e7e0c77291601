//! Domain invariant checks — "crash loudly in development, degrade
//! gracefully in release". `check` walks the handful of universally
//! quantified properties a reachable `World` must satisfy (zone membership
//! uniqueness, resource ordering, timeline channel-disjointness, engagement
//! symmetry) and returns the first one it finds broken.
//!
//! A violation is a bug, not a validation error — callers don't retry or
//! recover the specific operation, they abort the current tick: emit
//! `Event::InvariantViolated`, log via `log::error!`, and discard whatever
//! pending effects that tick was carrying. `debug_assert!` still fires in
//! development builds so a violation is caught at the point it's introduced
//! rather than surfacing downstream as a quiet discarded tick.

use skirmish_types::Event;

use crate::world::World;

/// A broken domain invariant. Carries only a message — by the time one of
/// these is raised, there's no well-typed "retry this" action available, just
/// a diagnostic for whoever reads the event/log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("domain invariant violated: {0}")]
pub struct InvariantViolation(pub String);

/// Runs every invariant check, short-circuiting on the first failure
/// (checking the rest against an already-broken world wouldn't tell the
/// caller anything more actionable).
pub fn check(world: &World) -> Result<(), InvariantViolation> {
    check_resource_ordering(world)?;
    check_timeline_channel_disjointness(world)?;
    check_engagement_symmetry(world)?;
    check_card_zone_uniqueness(world)?;
    Ok(())
}

/// Runs `check`; on failure, emits `Event::InvariantViolated`, logs via
/// `log::error!` so the violation is visible without crashing a release
/// build, and `debug_assert!`s so development builds still fail loudly at
/// the call site.
pub fn check_and_report(world: &mut World) -> bool {
    match check(world) {
        Ok(()) => true,
        Err(violation) => {
            log::error!("{violation}");
            debug_assert!(false, "{violation}");
            world.events.emit(Event::InvariantViolated { message: violation.0 });
            false
        }
    }
}

fn check_resource_ordering(world: &World) -> Result<(), InvariantViolation> {
    for (id, agent) in world.agents.iter() {
        if !agent.resources.stamina.invariant_holds() {
            return Err(InvariantViolation(format!("{id:?}: stamina reserved/current/max out of order")));
        }
        if !agent.resources.focus.invariant_holds() {
            return Err(InvariantViolation(format!("{id:?}: focus reserved/current/max out of order")));
        }
        let blood = &agent.resources.blood;
        if blood.current < 0.0 || blood.current > blood.max {
            return Err(InvariantViolation(format!("{id:?}: blood.current out of [0, max]")));
        }
    }
    Ok(())
}

fn check_timeline_channel_disjointness(world: &World) -> Result<(), InvariantViolation> {
    for (id, agent) in world.agents.iter() {
        let Some(combat) = agent.combat.as_ref() else { continue };
        let slots = combat.timeline.slots();
        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                let (a, b) = (&slots[i], &slots[j]);
                let overlaps = a.start < b.end && b.start < a.end;
                if overlaps && a.channels.conflicts(b.channels) {
                    return Err(InvariantViolation(format!(
                        "{id:?}: timeline slots {i} and {j} overlap with conflicting channels"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn check_engagement_symmetry(world: &World) -> Result<(), InvariantViolation> {
    for ((a, b), _) in world.engagements.iter() {
        let (canon_a, canon_b) = skirmish_types::canonical_pair(a, b);
        if canon_a != *a || canon_b != *b {
            return Err(InvariantViolation(format!(
                "engagement key ({a:?}, {b:?}) is not stored in canonical order"
            )));
        }
    }
    Ok(())
}

/// Every `CardInstanceId` created for an encounter must sit in exactly one
/// zone (or the environment) at any instant — never zero, never more than
/// one. Checked by tallying occurrences across every agent's `ZoneSet` plus
/// the shared environment list.
fn check_card_zone_uniqueness(world: &World) -> Result<(), InvariantViolation> {
    let mut counts: std::collections::HashMap<skirmish_types::CardInstanceId, u32> = std::collections::HashMap::new();
    for (_, agent) in world.agents.iter() {
        let Some(combat) = agent.combat.as_ref() else { continue };
        for zone in [
            skirmish_types::Zone::Draw,
            skirmish_types::Zone::Hand,
            skirmish_types::Zone::Discard,
            skirmish_types::Zone::InPlay,
            skirmish_types::Zone::Exhaust,
        ] {
            if let Some(list) = combat.zones.list(zone) {
                for &id in list {
                    *counts.entry(id).or_default() += 1;
                }
            }
        }
    }
    for &id in &world.environment.instances {
        *counts.entry(id).or_default() += 1;
    }
    if let Some((&id, _)) = counts.iter().find(|(_, &count)| count > 1) {
        return Err(InvariantViolation(format!("{id:?} occupies more than one zone simultaneously")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_types::*;

    fn bare_agent() -> Agent {
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
            combat: Some(CombatState::new()),
            active_conditions: vec![],
            reaction_slot: None,
        }
    }

    #[test]
    fn fresh_world_satisfies_every_invariant() {
        let mut world = World::new(1);
        world.agents.insert(bare_agent());
        assert!(check(&world).is_ok());
    }

    #[test]
    fn out_of_order_resources_is_caught() {
        let mut world = World::new(1);
        let id = world.agents.insert(bare_agent());
        world.agent_mut(id).unwrap().resources.stamina.reserved = 999.0;
        assert!(check(&world).is_err());
    }

    #[test]
    fn duplicate_zone_membership_is_caught() {
        let mut world = World::new(1);
        let id = world.agents.insert(bare_agent());
        let card = crate::card_registry::create_instance(&mut world, CardId::new("thrust"));
        let combat = world.agent_mut(id).unwrap().combat.as_mut().unwrap();
        combat.zones.hand.push(card);
        combat.zones.discard.push(card);
        assert!(check(&world).is_err());
    }

    #[test]
    fn check_and_report_emits_event_and_returns_false() {
        let mut world = World::new(1);
        let id = world.agents.insert(bare_agent());
        world.agent_mut(id).unwrap().resources.focus.reserved = 999.0;
        assert!(!check_and_report(&mut world));
        assert!(world.events.current().iter().any(|e| matches!(e, Event::InvariantViolated { .. })));
    }
}
