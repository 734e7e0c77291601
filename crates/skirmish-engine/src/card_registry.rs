//! Card instance creation and zone transfers.
//!
//! Every `CardInstanceId` is owned exclusively by `World.card_instances`; the
//! zone lists on `Agent.combat.zones` (and `World.environment`) only ever
//! hold copies of ids that exist there. `move_between` is the single place
//! that enforces "every instance appears in exactly one zone at a time" —
//! it removes from the source list before inserting into the destination,
//! and refuses the move (an invariant violation, not a validation error) if
//! the id wasn't where the caller claimed it was.

use skirmish_types::{AgentId, CardId, CardInstance, CardInstanceId, Event, Zone};

use crate::world::World;

/// A zone transfer was attempted from a location that doesn't actually hold
/// the card — a domain invariant violation, not a recoverable command error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ZoneError {
    #[error("card instance not found in claimed source zone")]
    NotInSourceZone,
    #[error("agent has no combat state")]
    NoCombatState,
    #[error("destination zone is full")]
    Overflow,
}

/// Creates a new instance bound to `template`, not yet placed in any zone —
/// the caller is responsible for pushing it into `deck_cards`, a pool, or a
/// zone list immediately after.
pub fn create_instance(world: &mut World, template: CardId) -> CardInstanceId {
    let placeholder = CardInstanceId::new(0, 0);
    let id = world.card_instances.insert(CardInstance::new(placeholder, template));
    // `EntityRegistry::insert` hands back the id only after allocating the
    // slot, so the instance's own `.id` field needs a second write to match.
    world.card_instances.get_mut(id).unwrap().id = id;
    id
}

/// Removes `id` from `from`'s list on `agent`'s `ZoneSet` and appends it to
/// `to`'s list, emitting `CardMoved`. Environment moves go through
/// `move_to_environment` / `move_from_environment` instead, since the
/// environment isn't keyed to any one agent's `ZoneSet`.
pub fn move_between(
    world: &mut World,
    agent_id: AgentId,
    id: CardInstanceId,
    from: Zone,
    to: Zone,
) -> Result<(), ZoneError> {
    let agent = world.agent_mut(agent_id).ok_or(ZoneError::NoCombatState)?;
    let combat = agent.combat.as_mut().ok_or(ZoneError::NoCombatState)?;

    let source = combat.zones.list_mut(from).ok_or(ZoneError::NotInSourceZone)?;
    let position = source.iter().position(|&existing| existing == id).ok_or(ZoneError::NotInSourceZone)?;
    source.remove(position);

    let dest = combat.zones.list_mut(to).ok_or(ZoneError::Overflow)?;
    dest.push(id);

    world.events.emit(Event::CardMoved { actor: agent_id, from, to });
    Ok(())
}

/// Moves a card instance out of an agent's zone and into the shared
/// environment, recording who threw it so it can be retrieved later.
pub fn move_to_environment(
    world: &mut World,
    agent_id: AgentId,
    id: CardInstanceId,
    from: Zone,
) -> Result<(), ZoneError> {
    {
        let agent = world.agent_mut(agent_id).ok_or(ZoneError::NoCombatState)?;
        let combat = agent.combat.as_mut().ok_or(ZoneError::NoCombatState)?;
        let source = combat.zones.list_mut(from).ok_or(ZoneError::NotInSourceZone)?;
        let position = source.iter().position(|&existing| existing == id).ok_or(ZoneError::NotInSourceZone)?;
        source.remove(position);
    }
    world.environment.instances.push(id);
    world.environment.thrown_by.insert(id, agent_id);
    world.events.emit(Event::CardMoved { actor: agent_id, from, to: Zone::Environment });
    Ok(())
}

/// Copies `deck_cards` into `draw` and shuffles, via the combat RNG stream.
/// Called once when an agent enters an encounter. `deck_cards` itself is
/// untouched — it remains the permanent record of ownership.
pub fn populate_from_deck_cards(world: &mut World, agent_id: AgentId) -> Result<(), ZoneError> {
    let deck: Vec<CardInstanceId> = {
        let agent = world.agent(agent_id).ok_or(ZoneError::NoCombatState)?;
        agent.deck_cards.clone()
    };
    let agent = world.agent_mut(agent_id).ok_or(ZoneError::NoCombatState)?;
    let combat = agent.combat.as_mut().ok_or(ZoneError::NoCombatState)?;
    combat.zones.draw = deck;
    world.rng.combat.shuffle(&mut world.agent_mut(agent_id).unwrap().combat.as_mut().unwrap().zones.draw);
    Ok(())
}

/// `shuffled_deck` draw-style refresh: top up `hand` to `hand_size` from
/// `draw`, reshuffling `discard` back into `draw` first if `draw` runs dry.
pub fn refresh_hand(world: &mut World, agent_id: AgentId, hand_size: usize) -> Result<(), ZoneError> {
    loop {
        let (hand_len, draw_len, discard_len) = {
            let agent = world.agent(agent_id).ok_or(ZoneError::NoCombatState)?;
            let combat = agent.combat.as_ref().ok_or(ZoneError::NoCombatState)?;
            (combat.zones.hand.len(), combat.zones.draw.len(), combat.zones.discard.len())
        };
        if hand_len >= hand_size {
            return Ok(());
        }
        if draw_len == 0 {
            if discard_len == 0 {
                return Ok(());
            }
            let agent = world.agent_mut(agent_id).ok_or(ZoneError::NoCombatState)?;
            let combat = agent.combat.as_mut().ok_or(ZoneError::NoCombatState)?;
            combat.zones.draw.append(&mut combat.zones.discard);
            world.rng.combat.shuffle(&mut world.agent_mut(agent_id).unwrap().combat.as_mut().unwrap().zones.draw);
            continue;
        }
        let top = {
            let agent = world.agent_mut(agent_id).ok_or(ZoneError::NoCombatState)?;
            let combat = agent.combat.as_mut().ok_or(ZoneError::NoCombatState)?;
            combat.zones.draw.remove(0)
        };
        move_pushed(world, agent_id, top, Zone::Hand)?;
    }
}

fn move_pushed(world: &mut World, agent_id: AgentId, id: CardInstanceId, to: Zone) -> Result<(), ZoneError> {
    let agent = world.agent_mut(agent_id).ok_or(ZoneError::NoCombatState)?;
    let combat = agent.combat.as_mut().ok_or(ZoneError::NoCombatState)?;
    let dest = combat.zones.list_mut(to).ok_or(ZoneError::Overflow)?;
    dest.push(id);
    world.events.emit(Event::CardMoved { actor: agent_id, from: Zone::Draw, to });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_types::{Agent, Body, CombatState, DrawStyle, ResourcePool, Resources, Side};

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
    fn create_instance_sets_its_own_id() {
        let mut world = World::new(1);
        let id = create_instance(&mut world, CardId::new("thrust"));
        assert_eq!(world.card_instance(id).unwrap().id, id);
    }

    #[test]
    fn move_between_shifts_zones_and_emits_event() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        let card = create_instance(&mut world, CardId::new("thrust"));
        world.agent_mut(agent_id).unwrap().combat.as_mut().unwrap().zones.hand.push(card);

        move_between(&mut world, agent_id, card, Zone::Hand, Zone::InPlay).unwrap();

        let combat = &world.agent(agent_id).unwrap().combat.as_ref().unwrap().zones;
        assert!(combat.hand.is_empty());
        assert_eq!(combat.in_play, vec![card]);
        assert_eq!(world.events.current().len(), 1);
    }

    #[test]
    fn move_between_rejects_card_not_in_source() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        let card = create_instance(&mut world, CardId::new("thrust"));
        let err = move_between(&mut world, agent_id, card, Zone::Hand, Zone::InPlay).unwrap_err();
        assert_eq!(err, ZoneError::NotInSourceZone);
    }

    #[test]
    fn populate_from_deck_cards_copies_without_draining_deck() {
        let mut world = World::new(7);
        let agent_id = world.agents.insert(bare_agent());
        let card = create_instance(&mut world, CardId::new("thrust"));
        world.agent_mut(agent_id).unwrap().deck_cards.push(card);

        populate_from_deck_cards(&mut world, agent_id).unwrap();

        let agent = world.agent(agent_id).unwrap();
        assert_eq!(agent.deck_cards, vec![card]);
        assert_eq!(agent.combat.as_ref().unwrap().zones.draw, vec![card]);
    }

    #[test]
    fn refresh_hand_tops_up_from_draw() {
        let mut world = World::new(3);
        let agent_id = world.agents.insert(bare_agent());
        for _ in 0..3 {
            let card = create_instance(&mut world, CardId::new("thrust"));
            world.agent_mut(agent_id).unwrap().deck_cards.push(card);
        }
        populate_from_deck_cards(&mut world, agent_id).unwrap();
        refresh_hand(&mut world, agent_id, 2).unwrap();
        let combat = &world.agent(agent_id).unwrap().combat.as_ref().unwrap().zones;
        assert_eq!(combat.hand.len(), 2);
        assert_eq!(combat.draw.len(), 1);
    }

    #[test]
    fn refresh_hand_reshuffles_discard_when_draw_empty() {
        let mut world = World::new(3);
        let agent_id = world.agents.insert(bare_agent());
        let card = create_instance(&mut world, CardId::new("thrust"));
        world.agent_mut(agent_id).unwrap().deck_cards.push(card);
        populate_from_deck_cards(&mut world, agent_id).unwrap();
        refresh_hand(&mut world, agent_id, 1).unwrap();
        // move it straight to discard, simulating a played-out hand
        move_between(&mut world, agent_id, card, Zone::Hand, Zone::Discard).unwrap();

        refresh_hand(&mut world, agent_id, 1).unwrap();
        let combat = &world.agent(agent_id).unwrap().combat.as_ref().unwrap().zones;
        assert_eq!(combat.hand, vec![card]);
        assert!(combat.discard.is_empty());
    }
}
