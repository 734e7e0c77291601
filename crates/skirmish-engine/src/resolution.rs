//! The resolution engine: builds `AttackContext`s for offensive slots in
//! time order, aggregates attacker/defender modifiers, picks an outcome,
//! and applies damage through armour and tissue.

use skirmish_data::armour;
use skirmish_data::condition_penalties::{blinded_for_mode, penalty_for};
use skirmish_types::{
    AgentId, AttackMode, Body, Condition, Event, GuardHeight, PartTag, Severity, Side, Stakes,
    TechniqueOutcome, Wound, WoundKind,
};

use crate::condition_iterator::iterate as iterate_conditions;
use crate::engagement_ops::flanking_status;
use crate::world::World;

/// Aggregated multiplicative/additive modifiers read off an agent's current
/// conditions, wounds, and overlays for one side of a technique pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatModifiers {
    pub hit_chance_mult: f32,
    pub damage_mult: f32,
    pub defense_mult: f32,
    pub dodge_mod: f32,
    pub footwork_mult: f32,
}

impl CombatModifiers {
    const NEUTRAL: CombatModifiers = CombatModifiers {
        hit_chance_mult: 1.0,
        damage_mult: 1.0,
        defense_mult: 1.0,
        dodge_mod: 0.0,
        footwork_mult: 1.0,
    };

    fn fold_condition(&mut self, condition: Condition, attack_mode: Option<AttackMode>) {
        let row = match (condition, attack_mode) {
            (Condition::Blinded, Some(mode)) => blinded_for_mode(mode),
            _ => penalty_for(condition),
        };
        self.hit_chance_mult *= row.hit_chance_mult;
        self.damage_mult *= row.damage_mult;
        self.defense_mult *= row.defense_mult;
        self.dodge_mod += row.dodge_mod;
        self.footwork_mult *= row.footwork_mult;
    }
}

fn dominant_hand_index(body: &Body, side: Side) -> Option<usize> {
    body.parts.iter().position(|p| p.tag == PartTag::Hand && p.side == side)
}

/// Aggregates the attacker's modifiers for a technique played at `attack_mode`
/// with `stakes`, against `opponent` (used to read conditions that depend on
/// the engagement, e.g. flanking doesn't apply to the attacker but pressure
/// does). `overlay_bonus` is the product of any overlapping footwork slot's
/// `overlay_bonus`.
pub fn attacker_modifiers(
    world: &World,
    agent_id: AgentId,
    opponent: AgentId,
    attack_mode: AttackMode,
    stakes: Stakes,
    overlay_bonus: f32,
) -> CombatModifiers {
    let mut mods = CombatModifiers::NEUTRAL;
    for condition in iterate_conditions(world, agent_id, Some(opponent)) {
        mods.fold_condition(condition.condition, Some(attack_mode));
    }
    if stakes >= Stakes::Committed {
        if let Some(agent) = world.agent(agent_id) {
            if agent.has_condition(Condition::Winded) {
                mods.fold_condition(Condition::Winded, Some(attack_mode));
            }
        }
    }
    if let Some(agent) = world.agent(agent_id) {
        if let Some(hand_index) = dominant_hand_index(&agent.body, agent.dominant_side) {
            let grasp = agent.body.grasp_strength(hand_index);
            mods.hit_chance_mult *= 1.0 - 0.25 * (1.0 - grasp);
            mods.damage_mult *= 0.5 + 0.5 * grasp;
        }
    }
    mods.damage_mult *= overlay_bonus;
    mods
}

/// Aggregates the defender's modifiers: mobility-based dodge, flanking
/// (via `defense_mult`), deafness, and a non-primary-target attention
/// penalty. Attention is applied multiplicatively onto `defense_mult`
/// alongside the others, so the penalty composes the same way every other
/// defensive modifier here does (see DESIGN.md).
pub fn defender_modifiers(world: &World, agent_id: AgentId, attacker: AgentId, is_primary_target: bool) -> CombatModifiers {
    let mut mods = CombatModifiers::NEUTRAL;
    for condition in iterate_conditions(world, agent_id, Some(attacker)) {
        mods.fold_condition(condition.condition, None);
    }
    if let Some(agent) = world.agent(agent_id) {
        let mobility = agent.body.mobility_score();
        mods.hit_chance_mult *= 1.0 - 0.3 * (1.0 - mobility);
    }
    match flanking_status(world, agent_id, attacker) {
        crate::engagement_ops::FlankingStatus::Flanked => mods.defense_mult *= 0.9,
        crate::engagement_ops::FlankingStatus::Surrounded => mods.defense_mult *= 0.75,
        crate::engagement_ops::FlankingStatus::None => {}
    }
    if !is_primary_target {
        mods.defense_mult *= 0.8;
    }
    mods
}

/// Coverage-weighted per-part hit-location weight, biased by guard height
/// (a high guard biases toward the head/neck, a low guard toward the legs)
/// and flanking (flanked defenders are more likely to take a hit to an
/// unguarded side part).
fn location_weight(part_tag: PartTag, guard_height: GuardHeight) -> f32 {
    match (guard_height, part_tag) {
        (GuardHeight::High, PartTag::Head) | (GuardHeight::High, PartTag::Eye) | (GuardHeight::High, PartTag::Neck) => 3.0,
        (GuardHeight::Mid, PartTag::Torso) => 3.0,
        (GuardHeight::Low, PartTag::Limb) => 3.0,
        (_, PartTag::Torso) => 1.5,
        (_, PartTag::Hand) => 0.5,
        _ => 1.0,
    }
}

pub fn roll_hit_location(world: &mut World, body: &Body, guard_height: GuardHeight) -> usize {
    let weights: Vec<f32> = body.parts.iter().map(|p| location_weight(p.tag, guard_height)).collect();
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return 0;
    }
    let roll = world.rng.body_part.next_f32() * total;
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w;
        if roll < acc {
            return i;
        }
    }
    weights.len() - 1
}

fn type_factor(kind: WoundKind) -> f32 {
    match kind {
        WoundKind::Slash => 1.0,
        WoundKind::Pierce => 0.6,
        WoundKind::Bludgeon => 0.2,
    }
}

fn severity_factor(severity: Severity) -> f32 {
    match severity {
        Severity::None => 0.0,
        Severity::Minor => 0.2,
        Severity::Inhibited => 0.4,
        Severity::Disabled => 0.6,
        Severity::Broken => 1.0,
        // Severed: nothing left to bleed from the wound site going forward.
        Severity::Missing => 1.0,
    }
}

/// Everything the tick scheduler needs to drive one offensive/defensive
/// pairing through outcome selection and damage application.
pub struct AttackContext {
    pub attacker: AgentId,
    pub defender: AgentId,
    pub weapon: skirmish_data::weapons::WeaponDefinition,
    pub attack_mode: AttackMode,
    pub guard_height: GuardHeight,
    pub hit_chance: f32,
}

/// Builds the combined hit chance from the technique's base accuracy, the
/// weapon's accuracy, and both sides' modifier aggregates, clamped to the
/// spec's `[0.05, 0.95]` band.
pub fn compute_hit_chance(weapon_accuracy: f32, attacker: &CombatModifiers, defender: &CombatModifiers) -> f32 {
    let raw = weapon_accuracy * attacker.hit_chance_mult * defender.hit_chance_mult;
    raw.clamp(0.05, 0.95)
}

/// Weighted outcome selection. Always draws both RNG rolls regardless of
/// whether the second is used, so the combat stream advances identically
/// whether or not the attack connects.
pub fn resolve_outcome(
    world: &mut World,
    hit_chance: f32,
    defender_technique: Option<(&'static str, GuardHeight)>,
    attack_guard_height: GuardHeight,
    defender_mods: &CombatModifiers,
) -> TechniqueOutcome {
    let hit_roll = world.rng.combat.next_f32();
    let second_roll = world.rng.combat.next_f32();
    if hit_roll >= hit_chance {
        return TechniqueOutcome::Miss;
    }

    let defend_weight = match defender_technique {
        Some((name, defend_height)) if defend_height == attack_guard_height => base_defend_chance(name) * defender_mods.defense_mult,
        Some(_) => 0.0,
        None => 0.0,
    };
    let glance_weight = 0.2;

    if second_roll < defend_weight {
        match defender_technique.map(|(name, _)| name) {
            Some("parry") => TechniqueOutcome::Parry,
            Some("block") => TechniqueOutcome::Block,
            Some("dodge") => TechniqueOutcome::Deflect,
            _ => TechniqueOutcome::Deflect,
        }
    } else if second_roll < defend_weight + glance_weight {
        TechniqueOutcome::Glance
    } else {
        TechniqueOutcome::CleanHit
    }
}

fn base_defend_chance(technique_name: &str) -> f32 {
    match technique_name {
        "parry" => 0.6,
        "block" => 0.55,
        "dodge" => 0.5,
        _ => 0.3,
    }
}

/// Result of damage application: the wound created (if any penetration
/// occurred) and whether the deepest reached part was severed.
pub struct DamageResult {
    pub wound: Option<Wound>,
    pub severed: bool,
}

/// Traverses armour outside-in then tissue in depth order on the struck
/// part, emitting every event along the way. `base_damage` is the
/// pre-armour energy (weapon base damage, already scaled by the attacker's
/// `damage_mult` and halved again by the caller for `Glance`).
pub fn apply_damage(
    world: &mut World,
    defender_id: AgentId,
    part_index: usize,
    kind: WoundKind,
    base_damage: f32,
    armour_ids: &[skirmish_types::ArmourId],
) -> DamageResult {
    let part_tag = world.agent(defender_id).unwrap().body.parts[part_index].tag;
    let side = world.agent(defender_id).unwrap().body.parts[part_index].side;

    let mut residual = base_damage;
    for armour_id in armour_ids {
        let Some(def) = armour::get_armour(armour_id) else { continue };
        if !def.covers.contains(&part_tag) {
            continue;
        }
        for (layer_index, layer) in def.layers.iter().enumerate() {
            let gap_roll = world.rng.combat.next_f32();
            if gap_roll < layer.coverage_gap_chance {
                world.events.emit(Event::AttackFoundGap { agent_id: defender_id, part_tag });
                continue;
            }
            if residual <= layer.deflect_threshold {
                world.events.emit(Event::ArmourDeflected { agent_id: defender_id, part_tag, layer_index });
                residual = 0.0;
                break;
            }
            residual -= layer.absorb;
            world.events.emit(Event::ArmourAbsorbed { agent_id: defender_id, part_tag, layer_index });
            if layer.absorb >= layer.deflect_threshold * 2.0 {
                world.events.emit(Event::ArmourLayerDestroyed { agent_id: defender_id, part_tag, layer_index });
            }
            if residual <= 0.0 {
                break;
            }
        }
        if residual <= 0.0 {
            break;
        }
    }

    if residual <= 0.0 {
        return DamageResult { wound: None, severed: false };
    }

    let agent = world.agent_mut(defender_id).unwrap();
    let part = &mut agent.body.parts[part_index];
    let mut deepest = 0;
    let mut energy = residual;
    for (i, layer) in part.tissue.iter().enumerate() {
        deepest = i;
        energy -= 1.0 * layer.integrity;
        if energy <= 0.0 {
            break;
        }
    }
    let has_artery = part.has_artery;
    // §4.5 step 3: "each penetrated layer flips its severity up one step" —
    // `deepest` is the 0-based index of the last layer reached, so
    // `deepest + 1` layers were penetrated.
    for _ in 0..=deepest {
        part.severity = part.severity.step_up();
    }
    let severity = part.severity;
    let artery_hit = has_artery && severity >= Severity::Disabled;

    let bleeding_rate = 0.1 * type_factor(kind) * severity_factor(severity) * if artery_hit { 5.0 } else { 1.0 };
    let wound = Wound { kind, part_index, deepest_layer_index: deepest, bleeding_rate, artery_hit };
    agent.body.wounds.push(wound.clone());

    world.events.emit(Event::WoundInflicted { agent_id: defender_id, wound: wound.clone(), part_tag, side });
    if artery_hit {
        world.events.emit(Event::HitMajorArtery { agent_id: defender_id, part_tag });
    }

    let mut severed = false;
    if severity == Severity::Missing {
        let orphaned = world.agent_mut(defender_id).unwrap().body.orphan_subtree(part_index);
        world.events.emit(Event::BodyPartSevered { agent_id: defender_id, part_tag, side });
        severed = true;
        for orphan_index in orphaned {
            let orphan_tag = world.agent(defender_id).unwrap().body.parts[orphan_index].tag;
            world.events.emit(Event::BodyPartSevered { agent_id: defender_id, part_tag: orphan_tag, side });
        }
    }

    DamageResult { wound: Some(wound), severed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_types::*;

    fn cuirass_agent(id: u32) -> Agent {
        Agent {
            id: AgentId::new(id, 0),
            body: Body {
                parts: vec![Part {
                    tag: PartTag::Torso,
                    side: Side::Centre,
                    parent: None,
                    can_grasp: false,
                    can_stand: true,
                    can_see: false,
                    can_hear: false,
                    tissue: vec![LayerState { layer: TissueLayer::Skin, integrity: 1.0 }, LayerState { layer: TissueLayer::Muscle, integrity: 1.0 }],
                    severity: Severity::None,
                    has_artery: true,
                    trauma_mult: 1.0,
                }],
                wounds: vec![],
            },
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

    #[test]
    fn sword_vs_plate_low_damage_deflects() {
        let mut world = World::new(42);
        let defender = world.agents.insert(cuirass_agent(1));
        let result = apply_damage(
            &mut world,
            defender,
            0,
            WoundKind::Slash,
            3.0,
            &[ArmourId::new("armour.plate_cuirass")],
        );
        // deflect_threshold on the cuirass' outer layer is 4.0; 3.0 energy
        // never penetrates either layer.
        assert!(result.wound.is_none());
        assert!(world.events.current().iter().any(|e| matches!(e, Event::ArmourDeflected { .. })));
    }

    #[test]
    fn hit_chance_clamped_to_band() {
        let attacker = CombatModifiers { hit_chance_mult: 10.0, ..CombatModifiers::NEUTRAL };
        let defender = CombatModifiers { hit_chance_mult: 10.0, ..CombatModifiers::NEUTRAL };
        assert_eq!(compute_hit_chance(1.0, &attacker, &defender), 0.95);
        let weak = CombatModifiers { hit_chance_mult: 0.0, ..CombatModifiers::NEUTRAL };
        assert_eq!(compute_hit_chance(1.0, &weak, &defender), 0.05);
    }

    #[test]
    fn deepest_layer_index_always_in_bounds() {
        let mut world = World::new(5);
        let defender = world.agents.insert(cuirass_agent(1));
        let result = apply_damage(&mut world, defender, 0, WoundKind::Pierce, 50.0, &[]);
        let wound = result.wound.unwrap();
        let parts_len = world.agent(defender).unwrap().body.parts[0].tissue.len();
        assert!(wound.deepest_layer_index < parts_len);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// No combination of weapon accuracy and modifier extremes pushes
        /// the resolved hit chance outside the [0.05, 0.95] band — the
        /// engine never resolves a guaranteed hit or a guaranteed miss.
        #[test]
        fn hit_chance_always_within_band(
            accuracy in -5.0f32..5.0,
            attacker_mult in -5.0f32..5.0,
            defender_mult in -5.0f32..5.0,
        ) {
            let attacker = CombatModifiers { hit_chance_mult: attacker_mult, ..CombatModifiers::NEUTRAL };
            let defender = CombatModifiers { hit_chance_mult: defender_mult, ..CombatModifiers::NEUTRAL };
            let chance = compute_hit_chance(accuracy, &attacker, &defender);
            prop_assert!(chance >= 0.05 && chance <= 0.95);
        }
    }
}
