//! The condition-penalty table the resolution engine reads when aggregating
//! `CombatModifiers` for an attacker or defender, plus the resource-threshold
//! table the physiology tick and condition iterator both consult, plus the
//! adrenaline expiry transition.

use skirmish_types::{AttackMode, Condition, Resource};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionPenalty {
    pub hit_chance_mult: f32,
    pub damage_mult: f32,
    pub defense_mult: f32,
    pub dodge_mod: f32,
    pub footwork_mult: f32,
}

impl ConditionPenalty {
    const NEUTRAL: ConditionPenalty = ConditionPenalty {
        hit_chance_mult: 1.0,
        damage_mult: 1.0,
        defense_mult: 1.0,
        dodge_mod: 0.0,
        footwork_mult: 1.0,
    };
}

/// Row for a stored or computed condition. `.blinded` additionally varies by
/// attack mode (thrust is penalized harder than swing) — `blinded_for_mode`
/// returns that adjusted row instead of this flat one.
pub fn penalty_for(condition: Condition) -> ConditionPenalty {
    match condition {
        Condition::Blinded => ConditionPenalty { hit_chance_mult: 0.6, ..ConditionPenalty::NEUTRAL },
        Condition::Deafened => ConditionPenalty { defense_mult: 0.9, ..ConditionPenalty::NEUTRAL },
        Condition::Winded => ConditionPenalty {
            hit_chance_mult: 0.85,
            footwork_mult: 0.7,
            ..ConditionPenalty::NEUTRAL
        },
        Condition::Bleeding => ConditionPenalty { footwork_mult: 0.9, ..ConditionPenalty::NEUTRAL },
        Condition::HypovolemicShock => ConditionPenalty {
            hit_chance_mult: 0.5,
            damage_mult: 0.6,
            footwork_mult: 0.4,
            ..ConditionPenalty::NEUTRAL
        },
        Condition::AdrenalineSurge => ConditionPenalty {
            hit_chance_mult: 1.1,
            damage_mult: 1.15,
            dodge_mod: 0.1,
            ..ConditionPenalty::NEUTRAL
        },
        Condition::AdrenalineCrash => ConditionPenalty {
            hit_chance_mult: 0.7,
            damage_mult: 0.8,
            footwork_mult: 0.6,
            ..ConditionPenalty::NEUTRAL
        },
        Condition::Flanked => ConditionPenalty { defense_mult: 0.75, dodge_mod: -0.1, ..ConditionPenalty::NEUTRAL },
        Condition::Surrounded => ConditionPenalty { defense_mult: 0.5, dodge_mod: -0.2, ..ConditionPenalty::NEUTRAL },
        Condition::Pressured => ConditionPenalty { hit_chance_mult: 0.9, ..ConditionPenalty::NEUTRAL },
        Condition::Controlled => ConditionPenalty { footwork_mult: 0.7, ..ConditionPenalty::NEUTRAL },
        Condition::Pain => ConditionPenalty { hit_chance_mult: 0.85, footwork_mult: 0.85, ..ConditionPenalty::NEUTRAL },
        Condition::Trauma => ConditionPenalty {
            hit_chance_mult: 0.75,
            damage_mult: 0.85,
            footwork_mult: 0.75,
            ..ConditionPenalty::NEUTRAL
        },
        Condition::Incapacitated => ConditionPenalty {
            hit_chance_mult: 0.0,
            damage_mult: 0.0,
            defense_mult: 0.0,
            dodge_mod: -1.0,
            footwork_mult: 0.0,
        },
    }
}

/// `.blinded`'s harsher-on-thrust adjustment, applied on top of the flat row.
pub fn blinded_for_mode(mode: AttackMode) -> ConditionPenalty {
    let base = penalty_for(Condition::Blinded);
    match mode {
        AttackMode::Thrust => ConditionPenalty { hit_chance_mult: base.hit_chance_mult * 0.7, ..base },
        AttackMode::Swing => ConditionPenalty { hit_chance_mult: base.hit_chance_mult * 0.9, ..base },
        AttackMode::None => base,
    }
}

/// `(resource, min_ratio, condition)` triples, ordered worst-first per
/// resource. The physiology tick and condition iterator both walk this
/// top-down per resource and yield the first (most severe) match.
pub const RESOURCE_THRESHOLDS: &[(Resource, f32, Condition)] = &[
    (Resource::Stamina, 0.2, Condition::Winded),
    (Resource::Stamina, 0.4, Condition::Pressured),
];

/// Blood-loss bands, most-severe first, read by the condition iterator.
pub const BLOOD_BANDS: &[(f32, Condition)] = &[
    (0.4, Condition::HypovolemicShock),
    (0.6, Condition::Bleeding),
    (0.8, Condition::Bleeding),
];

/// What a condition transitions to on expiry, if anything (only
/// `.adrenaline_surge` has one: it becomes `.adrenaline_crash`).
pub fn on_expire(condition: Condition) -> Option<Condition> {
    match condition {
        Condition::AdrenalineSurge => Some(Condition::AdrenalineCrash),
        _ => None,
    }
}
