//! The command boundary: validates and applies the typed intents in
//! `skirmish_types::Command` against the current phase, zone membership,
//! and resource availability before `World` is touched. No mutation occurs
//! on any `Err` return — every precondition is checked up front, matching
//! the rule interpreter's own "validate, then commit" discipline.
//!
//! **Resource reservation.** A play's stamina/focus cost is held in
//! `reserved`, not subtracted from `current`, the moment it's played —
//! `current` only actually drops when the reservation is finalized at
//! `commit_done` (see `finalize_reservations`). This is the only model
//! under which the stated invariant `reserved <= current` holds in every
//! reachable state: charging `current` immediately while also growing
//! `reserved` by the same amount double-counts the same stamina and breaks
//! the invariant for any play costing more than half of what's left. Commit
//! economy operations (`commit_add`/`withdraw`/`stack`'s one-focus cost)
//! are a different kind of spend — they're not later revisited, so they
//! charge `current` directly and immediately.

use skirmish_data::cards::get_card;
use skirmish_types::{
    AgentId, CardId, CardInstanceId, CardTags, Command, CommandError, PlayableFrom, Stakes, Zone,
};

use crate::card_registry;
use crate::scheduler;
use crate::world::{Phase, World};

/// `canPlayInPhase` from section 4.3: a card missing the active phase's bit
/// is rejected with `WrongPhase` before anything else is checked.
pub fn can_play_in_phase(tags: CardTags, phase: Phase) -> bool {
    match phase {
        Phase::PlayerCardSelection => tags.contains(CardTags::PHASE_SELECTION),
        Phase::CommitPhase => tags.contains(CardTags::PHASE_COMMIT),
        _ => false,
    }
}

/// Applies one command on behalf of `agent_id`, returning the phase the
/// world is in afterward (`CommitDone` drives the scheduler forward through
/// every non-interactive phase; every other command leaves `world.phase`
/// untouched on success).
pub fn apply_command(world: &mut World, agent_id: AgentId, command: Command) -> Result<Phase, CommandError> {
    match command {
        Command::PlayCard { card_id, time_start, target, modifier_of } => {
            play_card(world, agent_id, card_id, time_start, target, modifier_of)?;
            Ok(world.phase)
        }
        Command::CancelCard { card_id } => {
            cancel_card(world, agent_id, card_id)?;
            Ok(world.phase)
        }
        Command::CommitAdd { card_id } => {
            commit_add(world, agent_id, card_id)?;
            Ok(world.phase)
        }
        Command::CommitWithdraw { play_index } => {
            commit_withdraw(world, agent_id, play_index)?;
            Ok(world.phase)
        }
        Command::CommitStack { play_index, card_id } => {
            commit_stack(world, agent_id, play_index, card_id)?;
            Ok(world.phase)
        }
        Command::CommitDone => {
            require_phase(world, Phase::CommitPhase)?;
            finalize_reservations(world, agent_id);
            Ok(scheduler::drive(world, agent_id))
        }
        Command::SetPrimaryTarget { agent_id: target_id } => {
            set_primary_target(world, agent_id, target_id)?;
            Ok(world.phase)
        }
        Command::EndTurn => {
            require_phase(world, Phase::PlayerCardSelection)?;
            world.phase = Phase::CommitPhase;
            Ok(world.phase)
        }
    }
}

fn require_phase(world: &World, phase: Phase) -> Result<(), CommandError> {
    if world.phase == phase {
        Ok(())
    } else {
        Err(CommandError::WrongPhase)
    }
}

/// Where a playable instance was located, and what zone transfer (if any)
/// putting it `in_play` requires. `None` for pool/spell/equipped sources —
/// section 4.8 says those stay "always referenceable ... without zone
/// transfers", so playing one inserts straight onto the timeline and never
/// touches a `ZoneSet` list at all.
enum Source {
    Zone(Zone),
    Persistent,
}

fn locate_playable_instance(
    world: &World,
    agent_id: AgentId,
    card_id: &CardId,
    playable_from: PlayableFrom,
) -> Option<(CardInstanceId, Source)> {
    let agent = world.agent(agent_id)?;
    let matches = |id: &CardInstanceId| world.card_instance(*id).map(|inst| &inst.template == card_id).unwrap_or(false);

    if playable_from.contains(PlayableFrom::HAND) {
        if let Some(combat) = agent.combat.as_ref() {
            if let Some(&id) = combat.zones.hand.iter().find(|id| matches(id)) {
                return Some((id, Source::Zone(Zone::Hand)));
            }
        }
    }
    if playable_from.contains(PlayableFrom::POOL) {
        if let Some(&id) = agent.techniques_known.iter().find(|id| matches(id)) {
            return Some((id, Source::Persistent));
        }
    }
    if playable_from.contains(PlayableFrom::SPELLS) {
        if let Some(&id) = agent.spells_known.iter().find(|id| matches(id)) {
            return Some((id, Source::Persistent));
        }
    }
    if playable_from.contains(PlayableFrom::EQUIPPED) {
        if let Some(&id) = agent.techniques_known.iter().find(|id| matches(id)) {
            return Some((id, Source::Persistent));
        }
    }
    if playable_from.contains(PlayableFrom::INVENTORY) {
        if let Some(&id) = agent.inventory.iter().find(|id| matches(id)) {
            return Some((id, Source::Zone(Zone::Exhaust)));
        }
    }
    if playable_from.contains(PlayableFrom::ENVIRONMENT) {
        if let Some(&id) = world.environment.instances.iter().find(|id| matches(id)) {
            return Some((id, Source::Zone(Zone::Environment)));
        }
    }
    None
}

fn stamina_available(world: &World, agent_id: AgentId) -> Option<f32> {
    let r = &world.agent(agent_id)?.resources.stamina;
    Some(r.current - r.reserved)
}

fn focus_available(world: &World, agent_id: AgentId) -> Option<f32> {
    let r = &world.agent(agent_id)?.resources.focus;
    Some(r.current - r.reserved)
}

fn reserve_cost(world: &mut World, agent_id: AgentId, stamina: f32, focus: f32) {
    if let Some(agent) = world.agent_mut(agent_id) {
        agent.resources.stamina.reserved += stamina;
        agent.resources.focus.reserved += focus;
    }
}

fn release_reserved(world: &mut World, agent_id: AgentId, stamina: f32, focus: f32) {
    if let Some(agent) = world.agent_mut(agent_id) {
        agent.resources.stamina.reserved = (agent.resources.stamina.reserved - stamina).max(0.0);
        agent.resources.focus.reserved = (agent.resources.focus.reserved - focus).max(0.0);
    }
}

/// Spends one focus immediately and irrevocably — the commit-phase
/// operation charge, as opposed to a card's own reservable cost.
fn spend_focus_now(world: &mut World, agent_id: AgentId, amount: f32) -> Result<(), CommandError> {
    if focus_available(world, agent_id).unwrap_or(0.0) + f32::EPSILON < amount {
        return Err(CommandError::InsufficientFocus);
    }
    let agent = world.agent_mut(agent_id).ok_or(CommandError::InvalidPlaySource)?;
    agent.resources.focus.current -= amount;
    Ok(())
}

/// Ends the commit phase's refund window: every reservation an agent is
/// still holding becomes a real, final spend. Called once, right before the
/// scheduler is driven out of `CommitPhase` — after this, `cancel_card` and
/// `commit_withdraw` are no longer reachable (their precondition phases have
/// passed), so nothing will ever ask for these reservations back.
fn finalize_reservations(world: &mut World, agent_id: AgentId) {
    if let Some(agent) = world.agent_mut(agent_id) {
        agent.resources.stamina.current = (agent.resources.stamina.current - agent.resources.stamina.reserved).max(0.0);
        agent.resources.stamina.reserved = 0.0;
        agent.resources.focus.current = (agent.resources.focus.current - agent.resources.focus.reserved).max(0.0);
        agent.resources.focus.reserved = 0.0;
    }
}

fn play_card(
    world: &mut World,
    agent_id: AgentId,
    card_id: CardId,
    time_start: Option<f32>,
    target: Option<AgentId>,
    modifier_of: Option<usize>,
) -> Result<(), CommandError> {
    if !matches!(world.phase, Phase::PlayerCardSelection | Phase::CommitPhase) {
        return Err(CommandError::WrongPhase);
    }
    let template = get_card(card_id.as_str()).ok_or(CommandError::InvalidPlaySource)?;
    if !template.combat_playable {
        return Err(CommandError::NotCombatPlayable);
    }
    if !can_play_in_phase(template.tags, world.phase) {
        return Err(CommandError::WrongPhase);
    }
    if template.playable_from.is_empty() {
        return Err(CommandError::InvalidPlaySource);
    }

    let (instance_id, source) =
        locate_playable_instance(world, agent_id, &card_id, template.playable_from).ok_or(CommandError::CardNotInHand)?;

    let stamina_cost = template.cost.stamina as f32;
    let focus_cost = template.cost.focus as f32;
    if stamina_available(world, agent_id).unwrap_or(0.0) + f32::EPSILON < stamina_cost {
        return Err(CommandError::InsufficientStamina);
    }
    if focus_available(world, agent_id).unwrap_or(0.0) + f32::EPSILON < focus_cost {
        return Err(CommandError::InsufficientFocus);
    }

    if let (Some(technique), Some(other)) = (template.technique, target) {
        if let Some(engagement) = world.engagements.get(&agent_id, &other) {
            if !technique.reach.contains(engagement.range) {
                return Err(CommandError::OutOfRange);
            }
        }
    }

    if let Some(play_index) = modifier_of {
        let stack_full = {
            let combat = world.agent(agent_id).and_then(|a| a.combat.as_ref()).ok_or(CommandError::InvalidPlaySource)?;
            let slot = combat.timeline.get(play_index).ok_or(CommandError::InvalidTarget)?;
            slot.play.modifier_stack.is_full()
        };
        if stack_full {
            return Err(CommandError::Overflow);
        }
        let combat = world.agent_mut(agent_id).and_then(|a| a.combat.as_mut()).ok_or(CommandError::InvalidPlaySource)?;
        let slot = combat.timeline.get_mut(play_index).ok_or(CommandError::InvalidTarget)?;
        let _ = slot.play.modifier_stack.try_push(instance_id);
    } else {
        template.technique.ok_or(CommandError::InvalidTarget)?;
        scheduler::insert_play(world, agent_id, instance_id, time_start, target, Stakes::Guarded)
            .ok_or(CommandError::ChannelConflict)?;
    }

    reserve_cost(world, agent_id, stamina_cost, focus_cost);

    if let Source::Zone(from) = source {
        if from == Zone::Environment {
            // Retrieval from the environment isn't a per-agent zone move;
            // `move_to_environment`'s inverse isn't needed for play, only
            // for throwing — just drop it from the shared list.
            world.environment.instances.retain(|&id| id != instance_id);
            world.environment.thrown_by.remove(&instance_id);
            let combat = world.agent_mut(agent_id).and_then(|a| a.combat.as_mut()).ok_or(CommandError::InvalidPlaySource)?;
            combat.zones.in_play.push(instance_id);
        } else {
            card_registry::move_between(world, agent_id, instance_id, from, Zone::InPlay)
                .map_err(|_| CommandError::InvalidPlaySource)?;
        }
    } else {
        // Persistent pool source: goes straight onto the timeline above,
        // no zone bookkeeping.
    }

    Ok(())
}

fn cancel_card(world: &mut World, agent_id: AgentId, card_id: CardId) -> Result<(), CommandError> {
    if !matches!(world.phase, Phase::PlayerCardSelection | Phase::CommitPhase) {
        return Err(CommandError::WrongPhase);
    }
    let template = get_card(card_id.as_str()).ok_or(CommandError::InvalidPlaySource)?;

    let instance_id = {
        let combat = world.agent(agent_id).and_then(|a| a.combat.as_ref()).ok_or(CommandError::InvalidPlaySource)?;
        combat
            .zones
            .in_play
            .iter()
            .find(|&&id| world.card_instance(id).map(|inst| inst.template == card_id).unwrap_or(false))
            .copied()
            .ok_or(CommandError::CardNotInHand)?
    };

    let slot_index = {
        let combat = world.agent(agent_id).and_then(|a| a.combat.as_ref()).ok_or(CommandError::InvalidPlaySource)?;
        combat.timeline.slots().iter().position(|s| s.play.action == instance_id)
    };
    if let Some(index) = slot_index {
        let combat = world.agent_mut(agent_id).and_then(|a| a.combat.as_mut()).ok_or(CommandError::InvalidPlaySource)?;
        combat.timeline.remove(index);
    }

    release_reserved(world, agent_id, template.cost.stamina as f32, template.cost.focus as f32);
    card_registry::move_between(world, agent_id, instance_id, Zone::InPlay, Zone::Hand).map_err(|_| CommandError::InvalidPlaySource)?;
    Ok(())
}

fn commit_add(world: &mut World, agent_id: AgentId, card_id: CardId) -> Result<(), CommandError> {
    require_phase(world, Phase::CommitPhase)?;
    let template = get_card(card_id.as_str()).ok_or(CommandError::InvalidPlaySource)?;
    if !template.combat_playable {
        return Err(CommandError::NotCombatPlayable);
    }
    let instance_id = {
        let combat = world.agent(agent_id).and_then(|a| a.combat.as_ref()).ok_or(CommandError::InvalidPlaySource)?;
        combat
            .zones
            .hand
            .iter()
            .find(|&&id| world.card_instance(id).map(|inst| inst.template == card_id).unwrap_or(false))
            .copied()
            .ok_or(CommandError::CardNotInHand)?
    };
    let stamina_cost = template.cost.stamina as f32;
    let focus_cost = template.cost.focus as f32;
    if stamina_available(world, agent_id).unwrap_or(0.0) + f32::EPSILON < stamina_cost {
        return Err(CommandError::InsufficientStamina);
    }

    spend_focus_now(world, agent_id, 1.0)?;

    let play_index = scheduler::insert_play(world, agent_id, instance_id, None, None, Stakes::Guarded)
        .ok_or(CommandError::ChannelConflict)?;
    let combat = world.agent_mut(agent_id).and_then(|a| a.combat.as_mut()).ok_or(CommandError::InvalidPlaySource)?;
    if let Some(slot) = combat.timeline.get_mut(play_index) {
        slot.play.added_in_commit = true;
    }

    reserve_cost(world, agent_id, stamina_cost, focus_cost);
    card_registry::move_between(world, agent_id, instance_id, Zone::Hand, Zone::InPlay).map_err(|_| CommandError::InvalidPlaySource)?;
    Ok(())
}

fn commit_withdraw(world: &mut World, agent_id: AgentId, play_index: usize) -> Result<(), CommandError> {
    require_phase(world, Phase::CommitPhase)?;
    spend_focus_now(world, agent_id, 1.0)?;

    let instance_id = {
        let combat = world.agent(agent_id).and_then(|a| a.combat.as_ref()).ok_or(CommandError::InvalidPlaySource)?;
        combat.timeline.get(play_index).map(|s| s.play.action).ok_or(CommandError::InvalidTarget)?
    };
    let template = world
        .card_instance(instance_id)
        .and_then(|inst| get_card(inst.template.as_str()))
        .ok_or(CommandError::InvalidPlaySource)?;

    let combat = world.agent_mut(agent_id).and_then(|a| a.combat.as_mut()).ok_or(CommandError::InvalidPlaySource)?;
    combat.timeline.remove(play_index);

    release_reserved(world, agent_id, template.cost.stamina as f32, template.cost.focus as f32);
    card_registry::move_between(world, agent_id, instance_id, Zone::InPlay, Zone::Hand).map_err(|_| CommandError::InvalidPlaySource)?;
    Ok(())
}

/// Exact-template-equality reading of "matching template" (section 9's open
/// question on whether a compatible family is allowed instead) — the
/// conservative interpretation, since a looser family match would need a
/// notion of card-family grouping the data model doesn't otherwise carry.
fn commit_stack(world: &mut World, agent_id: AgentId, play_index: usize, card_id: CardId) -> Result<(), CommandError> {
    require_phase(world, Phase::CommitPhase)?;

    let lead_instance = {
        let combat = world.agent(agent_id).and_then(|a| a.combat.as_ref()).ok_or(CommandError::InvalidPlaySource)?;
        combat.timeline.get(play_index).map(|s| s.play.action).ok_or(CommandError::InvalidTarget)?
    };
    let lead_template = world.card_instance(lead_instance).map(|inst| inst.template.clone()).ok_or(CommandError::InvalidPlaySource)?;
    if lead_template != card_id {
        return Err(CommandError::InvalidTarget);
    }

    let template = get_card(card_id.as_str()).ok_or(CommandError::InvalidPlaySource)?;
    let instance_id = {
        let combat = world.agent(agent_id).and_then(|a| a.combat.as_ref()).ok_or(CommandError::InvalidPlaySource)?;
        combat
            .zones
            .hand
            .iter()
            .find(|&&id| world.card_instance(id).map(|inst| inst.template == card_id).unwrap_or(false))
            .copied()
            .ok_or(CommandError::CardNotInHand)?
    };

    let stamina_cost = template.cost.stamina as f32;
    if stamina_available(world, agent_id).unwrap_or(0.0) + f32::EPSILON < stamina_cost {
        return Err(CommandError::InsufficientStamina);
    }

    let already_stacked = world.turn_state.stacked_plays.contains(&(agent_id, play_index));
    if !already_stacked {
        spend_focus_now(world, agent_id, 1.0)?;
        world.turn_state.stacked_plays.insert((agent_id, play_index));
    }

    let combat = world.agent_mut(agent_id).and_then(|a| a.combat.as_mut()).ok_or(CommandError::InvalidPlaySource)?;
    let slot = combat.timeline.get_mut(play_index).ok_or(CommandError::InvalidTarget)?;
    slot.play.reinforcements.push(instance_id);

    reserve_cost(world, agent_id, stamina_cost, 0.0);
    card_registry::move_between(world, agent_id, instance_id, Zone::Hand, Zone::InPlay).map_err(|_| CommandError::InvalidPlaySource)?;
    Ok(())
}

/// Retargeting itself is free; the non-primary-target defence penalty in
/// `resolution::defender_modifiers` is where the attention cost actually
/// bites.
fn set_primary_target(world: &mut World, agent_id: AgentId, target_id: AgentId) -> Result<(), CommandError> {
    let combat = world.agent_mut(agent_id).and_then(|a| a.combat.as_mut()).ok_or(CommandError::InvalidPlaySource)?;
    combat.primary_target = Some(target_id);
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

    fn hand_with(world: &mut World, agent_id: AgentId, card: &str) -> CardInstanceId {
        let id = card_registry::create_instance(world, CardId::new(card));
        world.agent_mut(agent_id).unwrap().combat.as_mut().unwrap().zones.hand.push(id);
        id
    }

    #[test]
    fn play_card_wrong_phase_is_rejected_without_mutation() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        hand_with(&mut world, agent_id, "thrust");
        world.phase = Phase::DrawHand;
        let err = apply_command(&mut world, agent_id, Command::PlayCard { card_id: CardId::new("thrust"), time_start: None, target: None, modifier_of: None }).unwrap_err();
        assert_eq!(err, CommandError::WrongPhase);
        assert_eq!(world.agent(agent_id).unwrap().combat.as_ref().unwrap().zones.hand.len(), 1);
    }

    #[test]
    fn play_card_reserves_without_touching_current() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        hand_with(&mut world, agent_id, "thrust");
        world.phase = Phase::PlayerCardSelection;

        apply_command(&mut world, agent_id, Command::PlayCard { card_id: CardId::new("thrust"), time_start: Some(0.0), target: None, modifier_of: None }).unwrap();

        let stamina = world.agent(agent_id).unwrap().resources.stamina;
        assert!(stamina.invariant_holds());
        assert!(stamina.reserved > 0.0);
        assert_eq!(stamina.current, stamina.max);
        assert_eq!(world.agent(agent_id).unwrap().combat.as_ref().unwrap().zones.in_play.len(), 1);
    }

    #[test]
    fn play_card_insufficient_stamina_is_rejected() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        hand_with(&mut world, agent_id, "thrust");
        world.agent_mut(agent_id).unwrap().resources.stamina.current = 0.0;
        world.phase = Phase::PlayerCardSelection;

        let err = apply_command(&mut world, agent_id, Command::PlayCard { card_id: CardId::new("thrust"), time_start: None, target: None, modifier_of: None }).unwrap_err();
        assert_eq!(err, CommandError::InsufficientStamina);
    }

    #[test]
    fn cancel_card_refunds_reservation_and_returns_to_hand() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        hand_with(&mut world, agent_id, "thrust");
        world.phase = Phase::PlayerCardSelection;
        apply_command(&mut world, agent_id, Command::PlayCard { card_id: CardId::new("thrust"), time_start: Some(0.0), target: None, modifier_of: None }).unwrap();

        apply_command(&mut world, agent_id, Command::CancelCard { card_id: CardId::new("thrust") }).unwrap();

        let combat = world.agent(agent_id).unwrap().combat.as_ref().unwrap();
        assert_eq!(combat.zones.hand.len(), 1);
        assert!(combat.zones.in_play.is_empty());
        assert_eq!(world.agent(agent_id).unwrap().resources.stamina.reserved, 0.0);
    }

    #[test]
    fn commit_withdraw_spends_one_focus_and_releases_stamina_reservation() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        hand_with(&mut world, agent_id, "thrust");
        world.phase = Phase::PlayerCardSelection;
        apply_command(&mut world, agent_id, Command::PlayCard { card_id: CardId::new("thrust"), time_start: Some(0.0), target: None, modifier_of: None }).unwrap();
        world.phase = Phase::CommitPhase;

        let focus_before = world.agent(agent_id).unwrap().resources.focus.current;
        apply_command(&mut world, agent_id, Command::CommitWithdraw { play_index: 0 }).unwrap();

        let agent = world.agent(agent_id).unwrap();
        assert_eq!(agent.resources.focus.current, focus_before - 1.0);
        assert_eq!(agent.resources.stamina.reserved, 0.0);
        assert!(agent.combat.as_ref().unwrap().timeline.get(0).is_none());
        assert_eq!(agent.combat.as_ref().unwrap().zones.hand.len(), 1);
    }

    #[test]
    fn commit_done_finalizes_reservation_into_a_real_spend() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        hand_with(&mut world, agent_id, "thrust");
        world.phase = Phase::PlayerCardSelection;
        apply_command(&mut world, agent_id, Command::PlayCard { card_id: CardId::new("thrust"), time_start: Some(0.0), target: None, modifier_of: None }).unwrap();
        world.phase = Phase::CommitPhase;

        let stamina_before = world.agent(agent_id).unwrap().resources.stamina.current;
        let reserved = world.agent(agent_id).unwrap().resources.stamina.reserved;
        apply_command(&mut world, agent_id, Command::CommitDone).unwrap();

        let stamina = world.agent(agent_id).unwrap().resources.stamina;
        assert_eq!(stamina.current, stamina_before - reserved);
        assert_eq!(stamina.reserved, 0.0);
    }

    #[test]
    fn commit_stack_charges_focus_once_then_free() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        hand_with(&mut world, agent_id, "thrust");
        world.phase = Phase::PlayerCardSelection;
        apply_command(&mut world, agent_id, Command::PlayCard { card_id: CardId::new("thrust"), time_start: Some(0.0), target: None, modifier_of: None }).unwrap();
        world.phase = Phase::CommitPhase;
        hand_with(&mut world, agent_id, "thrust");
        hand_with(&mut world, agent_id, "thrust");

        let focus_after_lead = world.agent(agent_id).unwrap().resources.focus.current;
        apply_command(&mut world, agent_id, Command::CommitStack { play_index: 0, card_id: CardId::new("thrust") }).unwrap();
        let focus_after_first_stack = world.agent(agent_id).unwrap().resources.focus.current;
        assert_eq!(focus_after_first_stack, focus_after_lead - 1.0);

        apply_command(&mut world, agent_id, Command::CommitStack { play_index: 0, card_id: CardId::new("thrust") }).unwrap();
        let focus_after_second_stack = world.agent(agent_id).unwrap().resources.focus.current;
        assert_eq!(focus_after_second_stack, focus_after_first_stack);
    }

    #[test]
    fn end_turn_transitions_selection_to_commit() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        world.phase = Phase::PlayerCardSelection;
        let phase = apply_command(&mut world, agent_id, Command::EndTurn).unwrap();
        assert_eq!(phase, Phase::CommitPhase);
    }

    #[test]
    fn set_primary_target_updates_attention_focus() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        let other = world.agents.insert(bare_agent());
        apply_command(&mut world, agent_id, Command::SetPrimaryTarget { agent_id: other }).unwrap();
        assert_eq!(world.agent(agent_id).unwrap().combat.as_ref().unwrap().primary_target, Some(other));
    }

    #[test]
    fn play_card_out_of_range_is_rejected() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        let other = world.agents.insert(bare_agent());
        world.engagements.set(&agent_id, &other, Engagement::neutral(Reach::Far));
        hand_with(&mut world, agent_id, "thrust");
        world.phase = Phase::PlayerCardSelection;

        let err = apply_command(&mut world, agent_id, Command::PlayCard { card_id: CardId::new("thrust"), time_start: Some(0.0), target: Some(other), modifier_of: None }).unwrap_err();
        assert_eq!(err, CommandError::OutOfRange);
    }
}
