//! Builds the read-only `CombatSnapshot` external collaborators query —
//! frontend, AI, or CLI — without ever taking `&mut World`.
//!
//! A height conflict between a lead play and a candidate modifier is
//! "would the modifier's guard height fight the lead technique's own
//! guard height" — a modifier played at a height other than the lead's
//! is flagged as conflicting; a play with no technique (shouldn't happen
//! for anything already on the timeline, but the lookup stays total) never
//! conflicts, since there's no height to fight.

use skirmish_data::cards::get_card;
use skirmish_types::{
    AgentId, CardStatus, CombatSnapshot, EnemySummary, GuardHeight, PlaySummary, ResourceSnapshot,
};

use crate::commands::can_play_in_phase;
use crate::world::World;

const ALL_HEIGHTS: [GuardHeight; 3] = [GuardHeight::Low, GuardHeight::Mid, GuardHeight::High];

/// Builds the snapshot for `agent_id`'s own view of the encounter: their
/// hand/pool card playability, their own timeline, and every other agent
/// currently engaged with them.
pub fn build_snapshot(world: &World, agent_id: AgentId) -> CombatSnapshot {
    let phase = format!("{:?}", world.phase);
    let cards = card_statuses(world, agent_id);
    let plays = play_summaries(world, agent_id);
    let enemies = enemy_summaries(world, agent_id);
    let resources = resource_snapshot(world, agent_id);
    CombatSnapshot { phase, cards, plays, enemies, resources }
}

fn card_statuses(world: &World, agent_id: AgentId) -> Vec<CardStatus> {
    let Some(agent) = world.agent(agent_id) else { return Vec::new() };
    let Some(combat) = agent.combat.as_ref() else { return Vec::new() };

    let hand_templates = combat.zones.hand.iter().filter_map(|&id| world.card_instance(id)).map(|inst| inst.template.clone());

    hand_templates
        .map(|card_id| {
            let Some(template) = get_card(card_id.as_str()) else {
                return CardStatus {
                    card_id,
                    playable: false,
                    reason: Some("unknown template".to_string()),
                    cost_stamina: 0,
                    cost_focus: 0,
                    requires_target: false,
                };
            };
            let (playable, reason) = playability(world, agent_id, &template);
            CardStatus {
                card_id,
                playable,
                reason,
                cost_stamina: template.cost.stamina,
                cost_focus: template.cost.focus,
                requires_target: template.technique.is_some(),
            }
        })
        .collect()
}

fn playability(world: &World, agent_id: AgentId, template: &skirmish_types::Template) -> (bool, Option<String>) {
    if !template.combat_playable {
        return (false, Some("not combat playable".to_string()));
    }
    if !can_play_in_phase(template.tags, world.phase) {
        return (false, Some("wrong phase".to_string()));
    }
    let Some(agent) = world.agent(agent_id) else {
        return (false, Some("unknown agent".to_string()));
    };
    let stamina_left = agent.resources.stamina.current - agent.resources.stamina.reserved;
    if stamina_left + f32::EPSILON < template.cost.stamina as f32 {
        return (false, Some("insufficient stamina".to_string()));
    }
    let focus_left = agent.resources.focus.current - agent.resources.focus.reserved;
    if focus_left + f32::EPSILON < template.cost.focus as f32 {
        return (false, Some("insufficient focus".to_string()));
    }
    (true, None)
}

fn play_summaries(world: &World, agent_id: AgentId) -> Vec<PlaySummary> {
    let Some(combat) = world.agent(agent_id).and_then(|a| a.combat.as_ref()) else { return Vec::new() };

    combat
        .timeline
        .slots()
        .iter()
        .enumerate()
        .map(|(play_index, slot)| {
            let lead_height = world
                .card_instance(slot.play.action)
                .and_then(|inst| get_card(inst.template.as_str()))
                .and_then(|template| template.technique)
                .map(|technique| technique.guard_height);
            let modifier_attachability = ALL_HEIGHTS
                .iter()
                .map(|&height| (height, lead_height.map(|lead| lead != height).unwrap_or(false)))
                .collect();
            PlaySummary {
                play_index,
                start: slot.start,
                end: slot.end,
                channels: slot.channels,
                stakes: slot.play.stakes,
                modifier_attachability,
            }
        })
        .collect()
}

fn enemy_summaries(world: &World, agent_id: AgentId) -> Vec<EnemySummary> {
    let primary = world.agent(agent_id).and_then(|a| a.combat.as_ref()).and_then(|c| c.primary_target);
    world
        .engagements
        .iter()
        .filter_map(|((a, b), engagement)| {
            let other = if *a == agent_id {
                Some(*b)
            } else if *b == agent_id {
                Some(*a)
            } else {
                None
            }?;
            Some(EnemySummary { id: other, range: engagement.range, is_primary: primary == Some(other) })
        })
        .collect()
}

fn resource_snapshot(world: &World, agent_id: AgentId) -> ResourceSnapshot {
    let Some(agent) = world.agent(agent_id) else {
        return ResourceSnapshot { stamina_current: 0.0, stamina_max: 0.0, focus_current: 0.0, focus_max: 0.0 };
    };
    ResourceSnapshot {
        stamina_current: agent.resources.stamina.current - agent.resources.stamina.reserved,
        stamina_max: agent.resources.stamina.max,
        focus_current: agent.resources.focus.current - agent.resources.focus.reserved,
        focus_max: agent.resources.focus.max,
    }
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
    fn card_status_reports_insufficient_stamina() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        let card = crate::card_registry::create_instance(&mut world, CardId::new("thrust"));
        world.agent_mut(agent_id).unwrap().combat.as_mut().unwrap().zones.hand.push(card);
        world.agent_mut(agent_id).unwrap().resources.stamina.current = 0.0;
        world.phase = Phase::PlayerCardSelection;

        let snapshot = build_snapshot(&world, agent_id);
        assert_eq!(snapshot.cards.len(), 1);
        assert!(!snapshot.cards[0].playable);
        assert_eq!(snapshot.cards[0].reason.as_deref(), Some("insufficient stamina"));
    }

    #[test]
    fn enemy_summary_marks_primary_target() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        let other = world.agents.insert(bare_agent());
        world.engagements.set(&agent_id, &other, Engagement::neutral(Reach::Sabre));
        world.agent_mut(agent_id).unwrap().combat.as_mut().unwrap().primary_target = Some(other);

        let snapshot = build_snapshot(&world, agent_id);
        assert_eq!(snapshot.enemies.len(), 1);
        assert!(snapshot.enemies[0].is_primary);
    }

    #[test]
    fn resource_snapshot_excludes_reserved_amount() {
        let mut world = World::new(1);
        let agent_id = world.agents.insert(bare_agent());
        world.agent_mut(agent_id).unwrap().resources.stamina.reserved = 4.0;

        let snapshot = build_snapshot(&world, agent_id);
        assert_eq!(snapshot.resources.stamina_current, 6.0);
        assert_eq!(snapshot.resources.stamina_max, 10.0);
    }
}
