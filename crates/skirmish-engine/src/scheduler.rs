//! The tick scheduler: the FSM that drives one encounter tick from drawing
//! hands through resolving the timeline to advancing the clock.
//!
//! `DrawHand -> PlayerCardSelection -> CommitPhase -> TickResolution ->
//! ApplyEffects -> Advance -> (loop back to DrawHand, or EncounterSummary)`.
//! Every transition goes through `advance`, the single place that mutates
//! `world.phase` — nothing else in the crate assigns to it directly.

use std::collections::{HashMap, HashSet};

use skirmish_types::{
    canonical_pair, AgentId, CardTags, CombatOutcome, Event, EventTag, GuardHeight, RuleContext,
    Stakes, TimeSlot, Trigger, Wound,
};

use crate::card_registry;
use crate::engagement_ops::{self, ManoeuvreInputs};
use crate::physiology;
use crate::resolution;
use crate::rule_interpreter;
use crate::world::{Phase, World};

const HAND_SIZE: usize = 5;

/// Runs one phase's work and returns the phase the world is now in. Callers
/// (typically `commands::apply_command`'s `CommitDone`/turn-loop driver)
/// call this repeatedly until it returns a phase that requires player input
/// (`PlayerCardSelection`, `CommitPhase`) or `EncounterSummary`.
pub fn advance(world: &mut World, protagonist: AgentId) -> Phase {
    let next = match world.phase {
        Phase::DrawHand => {
            run_draw_hand(world);
            Phase::PlayerCardSelection
        }
        Phase::PlayerCardSelection => Phase::PlayerCardSelection,
        Phase::CommitPhase => Phase::CommitPhase,
        Phase::TickResolution => {
            run_tick_resolution(world);
            Phase::ApplyEffects
        }
        Phase::ApplyEffects => {
            run_apply_effects(world);
            Phase::Advance
        }
        Phase::Advance => run_advance(world, protagonist),
        Phase::EncounterSummary(outcome) => Phase::EncounterSummary(outcome),
    };
    world.phase = next;
    next
}

/// Drives the scheduler forward through every phase that doesn't require
/// player input, stopping at `PlayerCardSelection`, `CommitPhase`, or the
/// terminal `EncounterSummary`.
pub fn drive(world: &mut World, protagonist: AgentId) -> Phase {
    loop {
        let before = world.phase;
        let after = advance(world, protagonist);
        if after == before || matches!(after, Phase::PlayerCardSelection | Phase::CommitPhase) {
            return after;
        }
    }
}

fn run_draw_hand(world: &mut World) {
    for agent_id in world.agent_ids() {
        if world.agent(agent_id).and_then(|a| a.combat.as_ref()).is_none() {
            continue;
        }
        let _ = card_registry::refresh_hand(world, agent_id, HAND_SIZE);
        let hand: Vec<_> = world.agent(agent_id).unwrap().combat.as_ref().unwrap().zones.hand.clone();
        for instance_id in hand {
            let Some(instance) = world.card_instance(instance_id) else { continue };
            let ctx = RuleContext {
                acting_agent: agent_id,
                originating_card: instance.template.clone(),
                target: None,
                event_tag: None,
            };
            let _ = rule_interpreter::fire_rules(world, instance_id, Trigger::OnDraw, &ctx);
        }
    }
}

/// Inserts `card_id` onto `agent_id`'s timeline at the earliest slot its
/// technique's channels allow, starting from `time_start` (or the earliest
/// legal start if unset). Used by `commands::apply_command` for `PlayCard`.
pub fn insert_play(
    world: &mut World,
    agent_id: AgentId,
    instance_id: skirmish_types::CardInstanceId,
    time_start: Option<f32>,
    target: Option<AgentId>,
    stakes: Stakes,
) -> Option<usize> {
    let instance = world.card_instance(instance_id)?;
    let template = skirmish_data::cards::get_card(instance.template.as_str())?;
    let technique = template.technique?;
    let duration = technique.duration_ticks as f32 * 0.1;
    let combat = world.agent(agent_id)?.combat.as_ref()?;
    let start = match time_start {
        Some(t) => t,
        None => combat.timeline.next_available_start(0.0, duration, technique.channels)?,
    };
    if !combat.timeline.can_insert(start, duration, technique.channels) {
        return None;
    }
    let mut play = skirmish_types::Play::new(instance_id, stakes);
    play.target = target;
    let slot = TimeSlot { start, end: start + duration, channels: technique.channels, play };
    let combat = world.agent_mut(agent_id)?.combat.as_mut()?;
    combat.timeline.insert(slot)
}

/// Time-ordered (start, owner, slot index) view across every agent's
/// timeline for this tick — the deterministic global resolution order.
fn global_slot_order(world: &World) -> Vec<(AgentId, usize)> {
    let mut all: Vec<(AgentId, usize, f32)> = Vec::new();
    for agent_id in world.agent_ids() {
        if let Some(combat) = world.agent(agent_id).and_then(|a| a.combat.as_ref()) {
            for (index, slot) in combat.timeline.slots().iter().enumerate() {
                all.push((agent_id, index, slot.start));
            }
        }
    }
    all.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap().then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));
    all.into_iter().map(|(a, i, _)| (a, i)).collect()
}

/// For every pair of agents that each have an overlapping `MANOEUVRE`-tagged
/// play this tick aimed at one another (a footwork range-change contest),
/// scores both sides per §4.5 and returns the `(agent, slot_index)` pairs
/// whose range change loses (or ties) the contest and so must not fire.
/// A manoeuvre play with no opposing manoeuvre play this tick is never
/// suppressed — it simply resolves on its own.
fn manoeuvre_suppression(world: &World) -> HashSet<(AgentId, usize)> {
    let mut candidates: Vec<(AgentId, usize, AgentId)> = Vec::new();
    for agent_id in world.agent_ids() {
        let Some(combat) = world.agent(agent_id).and_then(|a| a.combat.as_ref()) else { continue };
        for (index, slot) in combat.timeline.slots().iter().enumerate() {
            let Some(instance) = world.card_instance(slot.play.action) else { continue };
            let Some(template) = skirmish_data::cards::get_card(instance.template.as_str()) else { continue };
            if !template.tags.contains(CardTags::MANOEUVRE) {
                continue;
            }
            let Some(opponent) = slot
                .play
                .target
                .or_else(|| combat.primary_target)
                .or_else(|| other_agent(world, agent_id))
            else {
                continue;
            };
            candidates.push((agent_id, index, opponent));
        }
    }

    let mut suppressed = HashSet::new();
    let mut seen_pairs = HashSet::new();
    for &(agent_a, slot_a, opponent_a) in &candidates {
        let pair = canonical_pair(&agent_a, &opponent_a);
        if !seen_pairs.insert(pair) {
            continue;
        }
        let Some(&(agent_b, slot_b, _)) = candidates.iter().find(|&&(a, _, opp)| a == opponent_a && opp == agent_a) else {
            continue;
        };
        let inputs_a = manoeuvre_inputs(world, agent_a, agent_b);
        let inputs_b = manoeuvre_inputs(world, agent_b, agent_a);
        match engagement_ops::resolve_manoeuvre_conflict(inputs_a, inputs_b) {
            Some(true) => {
                suppressed.insert((agent_b, slot_b));
            }
            Some(false) => {
                suppressed.insert((agent_a, slot_a));
            }
            None => {
                suppressed.insert((agent_a, slot_a));
                suppressed.insert((agent_b, slot_b));
            }
        }
    }
    suppressed
}

fn other_agent(world: &World, exclude: AgentId) -> Option<AgentId> {
    let ids = world.agent_ids();
    if ids.len() != 2 {
        return None;
    }
    ids.into_iter().find(|&id| id != exclude)
}

/// `speed` comes off the agent's current stamina ratio, `position`/`balance`
/// off the pair's stat-derived engagement axes (`balance` read from whichever
/// side of the canonicalised pair this agent occupies), `footwork_mult` off
/// the same condition-penalty aggregation the resolution engine folds into
/// `CombatModifiers` for this agent.
fn manoeuvre_inputs(world: &World, agent_id: AgentId, opponent: AgentId) -> ManoeuvreInputs {
    let speed = world.agent(agent_id).map(|a| a.resources.stamina.ratio()).unwrap_or(0.0);
    let engagement = world.engagements.get(&agent_id, &opponent).copied();
    let position = engagement.map(|e| e.position).unwrap_or(0.0);
    let (first, _) = canonical_pair(&agent_id, &opponent);
    let balance = engagement
        .map(|e| if first == agent_id { e.balance_a } else { e.balance_b })
        .unwrap_or(0.0);
    let mut footwork_mult = 1.0;
    for condition in crate::condition_iterator::iterate(world, agent_id, Some(opponent)) {
        footwork_mult *= skirmish_data::condition_penalties::penalty_for(condition.condition).footwork_mult;
    }
    ManoeuvreInputs { speed, position, balance, footwork_mult, standing_still: false }
}

fn run_tick_resolution(world: &mut World) {
    let order = global_slot_order(world);
    let mut resolved = std::collections::HashSet::new();
    let mut new_wounds: HashMap<AgentId, Vec<Wound>> = HashMap::new();
    let suppressed_manoeuvres = manoeuvre_suppression(world);

    for (owner, slot_index) in order {
        if resolved.contains(&(owner, slot_index)) {
            continue;
        }
        let Some(slot) = world.agent(owner).and_then(|a| a.combat.as_ref()).and_then(|c| c.timeline.get(slot_index)) else { continue };
        let Some(instance) = world.card_instance(slot.play.action) else { continue };
        let Some(template) = skirmish_data::cards::get_card(instance.template.as_str()) else { continue };
        let Some(technique) = template.technique else { continue };
        if technique.attack_mode == skirmish_types::AttackMode::None {
            resolved.insert((owner, slot_index));
            if suppressed_manoeuvres.contains(&(owner, slot_index)) {
                // Lost (or tied) a manoeuvre contest against an overlapping
                // opposing footwork play this tick: the card's cost was
                // already paid at play time, but its on_resolve effects
                // (the range change) don't fire.
                continue;
            }
            resolve_non_attack(world, owner, slot_index, &template);
            continue;
        }
        let Some(defender) = slot.play.target else {
            resolved.insert((owner, slot_index));
            continue;
        };

        resolved.insert((owner, slot_index));
        resolve_attack(world, owner, slot_index, defender, &template, &mut new_wounds);
    }

    world.turn_state.stacked_plays.clear();
    world.pending_wounds = new_wounds;
}

fn resolve_non_attack(world: &mut World, owner: AgentId, slot_index: usize, template: &skirmish_types::Template) {
    let Some(instance_id) = world
        .agent(owner)
        .and_then(|a| a.combat.as_ref())
        .and_then(|c| c.timeline.get(slot_index))
        .map(|s| s.play.action)
    else {
        return;
    };
    let target = world.agent(owner).and_then(|a| a.combat.as_ref()).and_then(|c| c.timeline.get(slot_index)).and_then(|s| s.play.target);
    let ctx = RuleContext { acting_agent: owner, originating_card: template.id.clone(), target, event_tag: None };
    let _ = rule_interpreter::fire_rules(world, instance_id, Trigger::OnResolve, &ctx);
}

fn resolve_attack(
    world: &mut World,
    attacker: AgentId,
    slot_index: usize,
    defender: AgentId,
    template: &skirmish_types::Template,
    new_wounds: &mut HashMap<AgentId, Vec<Wound>>,
) {
    let technique = template.technique.unwrap();
    let instance_id = world
        .agent(attacker)
        .and_then(|a| a.combat.as_ref())
        .and_then(|c| c.timeline.get(slot_index))
        .map(|s| s.play.action)
        .unwrap();
    let stakes = world
        .agent(attacker)
        .and_then(|a| a.combat.as_ref())
        .and_then(|c| c.timeline.get(slot_index))
        .map(|s| s.play.stakes)
        .unwrap_or(Stakes::Guarded);

    let is_primary = world.agent(defender).and_then(|a| a.combat.as_ref()).and_then(|c| c.primary_target) == Some(attacker)
        || world.agent(defender).and_then(|a| a.combat.as_ref()).and_then(|c| c.primary_target).is_none();

    let overlay = overlapping_footwork_bonus(world, attacker, slot_index);
    let attacker_mods = resolution::attacker_modifiers(world, attacker, defender, technique.attack_mode, stakes, overlay);
    let defender_mods = resolution::defender_modifiers(world, defender, attacker, is_primary);
    let weapon_accuracy = equipped_accuracy(world, attacker).unwrap_or(0.7);
    let hit_chance = resolution::compute_hit_chance(weapon_accuracy, &attacker_mods, &defender_mods);

    let defender_technique = active_defence(world, defender);
    let outcome = resolution::resolve_outcome(world, hit_chance, defender_technique, technique.guard_height, &defender_mods);

    world.events.emit(Event::TechniqueResolved { attacker_id: attacker, defender_id: defender, outcome });

    if matches!(outcome, skirmish_types::TechniqueOutcome::Miss | skirmish_types::TechniqueOutcome::Parry | skirmish_types::TechniqueOutcome::Block | skirmish_types::TechniqueOutcome::Deflect) {
        return;
    }

    let base_damage = weapon_damage(world, attacker).unwrap_or(4.0) * attacker_mods.damage_mult;
    let damage = if outcome == skirmish_types::TechniqueOutcome::Glance { base_damage * 0.5 } else { base_damage };
    let guard_height = defensive_guard_height(defender_technique).unwrap_or(GuardHeight::Mid);
    let defender_body = world.agent(defender).unwrap().body.clone();
    let part_index = resolution::roll_hit_location(world, &defender_body, guard_height);
    let armour_ids = world.agent(defender).unwrap().combat.as_ref().map(|c| c.equipped_armour.clone()).unwrap_or_default();
    let kind = attack_wound_kind(technique.attack_mode);
    let result = resolution::apply_damage(world, defender, part_index, kind, damage, &armour_ids);
    if let Some(wound) = result.wound {
        new_wounds.entry(defender).or_default().push(wound);
    }

    let ctx = RuleContext {
        acting_agent: attacker,
        originating_card: template.id.clone(),
        target: Some(defender),
        event_tag: None,
    };
    let _ = rule_interpreter::fire_rules(world, instance_id, Trigger::OnResolve, &ctx);
}

fn attack_wound_kind(mode: skirmish_types::AttackMode) -> skirmish_types::WoundKind {
    match mode {
        skirmish_types::AttackMode::Swing => skirmish_types::WoundKind::Slash,
        skirmish_types::AttackMode::Thrust => skirmish_types::WoundKind::Pierce,
        skirmish_types::AttackMode::None => skirmish_types::WoundKind::Bludgeon,
    }
}

fn overlapping_footwork_bonus(world: &World, owner: AgentId, slot_index: usize) -> f32 {
    let Some(combat) = world.agent(owner).and_then(|a| a.combat.as_ref()) else { return 1.0 };
    let Some(slot) = combat.timeline.get(slot_index) else { return 1.0 };
    let mut mult = 1.0;
    for (i, other) in combat.timeline.slots().iter().enumerate() {
        if i == slot_index {
            continue;
        }
        let overlaps = other.start < slot.end && slot.start < other.end;
        if !overlaps {
            continue;
        }
        if let Some(instance) = world.card_instance(other.play.action) {
            if let Some(template) = skirmish_data::cards::get_card(instance.template.as_str()) {
                if let Some(technique) = template.technique {
                    if let Some(bonus) = technique.overlay_bonus {
                        mult *= bonus;
                    }
                }
            }
        }
    }
    mult
}

fn equipped_accuracy(world: &World, agent_id: AgentId) -> Option<f32> {
    let weapon_id = world.agent(agent_id)?.combat.as_ref()?.equipped_weapon.clone()?;
    skirmish_data::weapons::get_weapon(&weapon_id).map(|w| w.accuracy)
}

fn weapon_damage(world: &World, agent_id: AgentId) -> Option<f32> {
    let weapon_id = world.agent(agent_id)?.combat.as_ref()?.equipped_weapon.clone()?;
    skirmish_data::weapons::get_weapon(&weapon_id).map(|w| w.base_damage)
}

/// The defensive card (if any) the defender has in play at this moment,
/// along with its guard height — used to decide whether a parry/block/dodge
/// roll is even in contention for this attack.
fn active_defence(world: &World, defender: AgentId) -> Option<(&'static str, GuardHeight)> {
    let combat = world.agent(defender)?.combat.as_ref()?;
    for slot in combat.timeline.slots() {
        let Some(instance) = world.card_instance(slot.play.action) else { continue };
        let name = instance.template.as_str();
        if matches!(name, "parry" | "block" | "dodge") {
            let technique = skirmish_data::cards::get_card(name).and_then(|t| t.technique)?;
            let label = match name {
                "parry" => "parry",
                "block" => "block",
                _ => "dodge",
            };
            return Some((label, technique.guard_height));
        }
    }
    None
}

fn defensive_guard_height(defence: Option<(&'static str, GuardHeight)>) -> Option<GuardHeight> {
    defence.map(|(_, h)| h)
}

fn run_apply_effects(world: &mut World) {
    let pending = std::mem::take(&mut world.pending_wounds);
    if !crate::invariants::check_and_report(world) {
        // Invariant broke during tick resolution: the physiology tick would
        // be reasoning over a world it can't trust, so this tick's wounds
        // (and any of this tick's event reactions) are discarded rather
        // than applied.
        return;
    }
    physiology::run_physiology_tick(world, &pending);

    // Dispatched after physiology, not before: `condition_gained` (e.g. the
    // adrenaline surge a severe wound just triggered) is only emitted during
    // the physiology tick itself, and on_event rules need to see it this
    // same apply_effects pass to deal a dud into hand before the next draw.
    let events = world.events.current().to_vec();
    for event in &events {
        let Some((tag, agents)) = event_dispatch_targets(event) else { continue };
        for agent_id in agents {
            fire_event_rules(world, agent_id, tag, event);
        }
    }
}

/// Maps an emitted event to the `EventTag`/agent(s) whose `on_event` rules
/// should be considered for it. Events with nobody to react as an agent
/// (phase bookkeeping, encounter-ending) return `None`.
fn event_dispatch_targets(event: &Event) -> Option<(EventTag, Vec<AgentId>)> {
    match event {
        Event::WoundInflicted { agent_id, .. } => Some((EventTag::WoundInflicted, vec![*agent_id])),
        Event::BodyPartSevered { agent_id, .. } => Some((EventTag::BodyPartSevered, vec![*agent_id])),
        Event::HitMajorArtery { agent_id, .. } => Some((EventTag::HitMajorArtery, vec![*agent_id])),
        Event::ArmourDeflected { agent_id, .. } => Some((EventTag::ArmourDeflected, vec![*agent_id])),
        Event::ArmourAbsorbed { agent_id, .. } => Some((EventTag::ArmourAbsorbed, vec![*agent_id])),
        Event::ArmourLayerDestroyed { agent_id, .. } => Some((EventTag::ArmourLayerDestroyed, vec![*agent_id])),
        Event::AttackFoundGap { agent_id, .. } => Some((EventTag::AttackFoundGap, vec![*agent_id])),
        Event::TechniqueResolved { attacker_id, defender_id, .. } => {
            Some((EventTag::TechniqueResolved, vec![*attacker_id, *defender_id]))
        }
        Event::AdvantageChanged { agent_id, .. } => Some((EventTag::AdvantageChanged, vec![*agent_id])),
        Event::CardMoved { actor, .. } => Some((EventTag::CardMoved, vec![*actor])),
        Event::MobDied { agent_id } => Some((EventTag::MobDied, vec![*agent_id])),
        Event::ConditionGained { agent_id, tag } => Some((*tag, vec![*agent_id])),
        Event::ConditionExpired { agent_id, tag } => Some((*tag, vec![*agent_id])),
        Event::StaminaDeducted { .. }
        | Event::GameStateTransitionedTo { .. }
        | Event::CombatEnded { .. }
        | Event::InvariantViolated { .. } => None,
    }
}

/// Fires `Trigger::OnEvent { tag }` against every rule-bearing instance
/// `agent_id` can currently react through: cards in play (e.g. riposte
/// reacting to its own armour-deflected event), cards already in hand, and
/// permanent pool techniques — the zone a dud card sits in before a
/// condition deals it into hand.
fn fire_event_rules(world: &mut World, agent_id: AgentId, tag: EventTag, _event: &Event) {
    let Some(agent) = world.agent(agent_id) else { return };
    let Some(combat) = agent.combat.as_ref() else { return };
    let mut instances = combat.zones.in_play.clone();
    instances.extend(combat.zones.hand.iter().copied());
    instances.extend(agent.techniques_known.iter().copied());
    instances.sort();
    instances.dedup();

    for instance_id in instances {
        let Some(instance) = world.card_instance(instance_id) else { continue };
        let ctx = RuleContext { acting_agent: agent_id, originating_card: instance.template.clone(), target: None, event_tag: Some(tag) };
        let _ = rule_interpreter::fire_rules(world, instance_id, Trigger::OnEvent { tag }, &ctx);
    }
}

fn run_advance(world: &mut World, protagonist: AgentId) -> Phase {
    world.tick += 1;
    for agent_id in world.agent_ids() {
        discard_spent_plays(world, agent_id);
    }
    world.events.swap();

    if let Some(outcome) = encounter_outcome(world, protagonist) {
        world.events.emit(Event::CombatEnded { outcome });
        return Phase::EncounterSummary(outcome);
    }
    Phase::DrawHand
}

fn discard_spent_plays(world: &mut World, agent_id: AgentId) {
    let Some(combat) = world.agent(agent_id).and_then(|a| a.combat.as_ref()) else { return };
    let spent: Vec<(usize, skirmish_types::CardInstanceId, skirmish_types::Zone)> = combat
        .timeline
        .slots()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let template = world.card_instance(s.play.action).and_then(|inst| skirmish_data::cards::get_card(inst.template.as_str()));
            let exhausts = template.map(|t| t.tags.contains(skirmish_types::CardTags::REACTION)).unwrap_or(false);
            (i, s.play.action, if exhausts { skirmish_types::Zone::Exhaust } else { skirmish_types::Zone::Discard })
        })
        .collect();
    for (_, instance_id, to) in spent.iter().rev() {
        let from = if world.agent(agent_id).unwrap().combat.as_ref().unwrap().zones.in_play.contains(instance_id) {
            skirmish_types::Zone::InPlay
        } else {
            continue;
        };
        let _ = card_registry::move_between(world, agent_id, *instance_id, from, *to);
    }
    if let Some(combat) = world.agent_mut(agent_id).and_then(|a| a.combat.as_mut()) {
        combat.timeline = skirmish_types::Timeline::new();
    }
}

/// `None` while the encounter continues. `protagonist` decides whose
/// perspective `Victory`/`Defeat` is reported from; any other agent
/// dropping to incapacitated counts toward the protagonist's victory.
fn encounter_outcome(world: &World, protagonist: AgentId) -> Option<CombatOutcome> {
    let protagonist_down = is_down(world, protagonist);
    let others_down = world.agent_ids().into_iter().filter(|&id| id != protagonist).all(|id| is_down(world, id));
    if protagonist_down {
        Some(CombatOutcome::Defeat)
    } else if others_down && world.agent_ids().len() > 1 {
        Some(CombatOutcome::Victory)
    } else {
        None
    }
}

fn is_down(world: &World, agent_id: AgentId) -> bool {
    let Some(agent) = world.agent(agent_id) else { return true };
    agent.resources.blood.current <= 0.0 || agent.has_condition(skirmish_types::Condition::Incapacitated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_types::*;

    fn combat_agent() -> Agent {
        Agent {
            id: AgentId::new(0, 0),
            body: Body { parts: vec![torso()], wounds: vec![] },
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
            severity: Severity::None,
            has_artery: false,
            trauma_mult: 1.0,
        }
    }

    #[test]
    fn draw_hand_then_selection_refreshes_hand() {
        let mut world = World::new(9);
        let agent_id = world.agents.insert(combat_agent());
        for _ in 0..5 {
            let card = card_registry::create_instance(&mut world, CardId::new("thrust"));
            world.agent_mut(agent_id).unwrap().deck_cards.push(card);
        }
        card_registry::populate_from_deck_cards(&mut world, agent_id).unwrap();
        let phase = drive(&mut world, agent_id);
        assert_eq!(phase, Phase::PlayerCardSelection);
        assert_eq!(world.agent(agent_id).unwrap().combat.as_ref().unwrap().zones.hand.len(), 5);
    }

    #[test]
    fn encounter_outcome_defeat_when_protagonist_down() {
        let mut world = World::new(1);
        let protagonist = world.agents.insert(combat_agent());
        world.agent_mut(protagonist).unwrap().resources.blood.current = 0.0;
        assert_eq!(encounter_outcome(&world, protagonist), Some(CombatOutcome::Defeat));
    }

    #[test]
    fn encounter_outcome_victory_when_lone_opponent_down() {
        let mut world = World::new(1);
        let protagonist = world.agents.insert(combat_agent());
        let enemy = world.agents.insert(combat_agent());
        world.agent_mut(enemy).unwrap().resources.blood.current = 0.0;
        assert_eq!(encounter_outcome(&world, protagonist), Some(CombatOutcome::Victory));
    }

    fn seat_advance(world: &mut World, agent_id: AgentId, opponent: AgentId) {
        let instance = card_registry::create_instance(world, CardId::new("advance"));
        let mut play = Play::new(instance, Stakes::Guarded);
        play.target = Some(opponent);
        let slot = TimeSlot { start: 0.0, end: 0.3, channels: Channels::FOOTWORK, play };
        world.agent_mut(agent_id).unwrap().combat.as_mut().unwrap().timeline.insert(slot);
    }

    #[test]
    fn identical_simultaneous_advances_apply_exactly_one_range_change() {
        let mut world = World::new(7);
        let a = world.agents.insert(combat_agent());
        let b = world.agents.insert(combat_agent());
        world.engagements.set(&a, &b, Engagement::neutral(Reach::Sabre));
        seat_advance(&mut world, a, b);
        seat_advance(&mut world, b, a);

        run_tick_resolution(&mut world);

        // Both sides are otherwise identical, so the contest should be a
        // stalemate: the `advance` on_resolve effect fires for neither side
        // and the range is unchanged from its seeded `Sabre`.
        assert_eq!(world.engagements.get(&a, &b).unwrap().range, Reach::Sabre);
    }

    #[test]
    fn lone_advance_with_no_opposing_manoeuvre_always_applies() {
        let mut world = World::new(7);
        let a = world.agents.insert(combat_agent());
        let b = world.agents.insert(combat_agent());
        world.engagements.set(&a, &b, Engagement::neutral(Reach::Sabre));
        seat_advance(&mut world, a, b);

        run_tick_resolution(&mut world);

        assert_eq!(world.engagements.get(&a, &b).unwrap().range, Reach::Sabre.step(-1));
    }

    #[test]
    fn faster_agent_wins_the_manoeuvre_contest() {
        let mut world = World::new(7);
        let a = world.agents.insert(combat_agent());
        let b = world.agents.insert(combat_agent());
        world.agent_mut(a).unwrap().resources.stamina.current = 10.0;
        world.agent_mut(b).unwrap().resources.stamina.current = 1.0;
        world.engagements.set(&a, &b, Engagement::neutral(Reach::Sabre));
        seat_advance(&mut world, a, b);
        seat_advance(&mut world, b, a);

        run_tick_resolution(&mut world);

        assert_eq!(world.engagements.get(&a, &b).unwrap().range, Reach::Sabre.step(-1));
    }

    #[test]
    fn adrenaline_surge_deals_panic_dud_into_hand() {
        let mut world = World::new(5);
        let agent_id = world.agents.insert(combat_agent());
        world.agent_mut(agent_id).unwrap().body.parts[0].severity = Severity::Inhibited;
        let panic = card_registry::create_instance(&mut world, CardId::new("panic"));
        world.agent_mut(agent_id).unwrap().combat.as_mut().unwrap().zones.discard.push(panic);
        let reflex = card_registry::create_instance(&mut world, CardId::new("startle_reflex"));
        world.agent_mut(agent_id).unwrap().techniques_known.push(reflex);

        let mut wounds = HashMap::new();
        wounds.insert(
            agent_id,
            vec![Wound { kind: WoundKind::Pierce, part_index: 0, deepest_layer_index: 0, bleeding_rate: 0.0, artery_hit: false }],
        );
        world.pending_wounds = wounds;

        run_apply_effects(&mut world);

        let agent = world.agent(agent_id).unwrap();
        assert!(agent.has_condition(Condition::AdrenalineSurge));
        let zones = &agent.combat.as_ref().unwrap().zones;
        assert!(zones.hand.contains(&panic));
        assert!(!zones.discard.contains(&panic));
    }
}
