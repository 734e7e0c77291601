//! Technique table — the attack-mode/channel/reach shapes that cards
//! embed or reference by id from `Effect::CombatTechnique`.

use skirmish_types::{AttackMode, Channels, GuardHeight, Reach, ReachBand, Technique, TechniqueId};

/// Look up a technique by id. `None` if unknown — callers (and
/// `validate_tables`) treat that as a dangling reference, not a panic.
pub fn get_technique(id: &TechniqueId) -> Option<Technique> {
    match id.as_str() {
        "thrust" => Some(thrust()),
        "swing" => Some(swing()),
        "advance" => Some(advance()),
        "retreat" => Some(retreat()),
        "parry" => Some(parry()),
        "block" => Some(block()),
        "dodge" => Some(dodge()),
        "feint" => Some(feint()),
        "riposte" => Some(riposte()),
        _ => None,
    }
}

/// Every technique id this table defines, for `validate_tables`.
pub const ALL: &[&str] =
    &["thrust", "swing", "advance", "retreat", "parry", "block", "dodge", "feint", "riposte"];

fn thrust() -> Technique {
    Technique {
        attack_mode: AttackMode::Thrust,
        channels: Channels::WEAPON,
        guard_height: GuardHeight::Mid,
        duration_ticks: 3,
        reach: ReachBand { min: Reach::Clinch, max: Reach::Sabre },
        overlay_bonus: None,
    }
}

fn swing() -> Technique {
    Technique {
        attack_mode: AttackMode::Swing,
        channels: Channels::WEAPON,
        guard_height: GuardHeight::High,
        duration_ticks: 4,
        reach: ReachBand { min: Reach::Dagger, max: Reach::Longsword },
        overlay_bonus: None,
    }
}

fn advance() -> Technique {
    Technique {
        attack_mode: AttackMode::None,
        channels: Channels::FOOTWORK,
        guard_height: GuardHeight::Mid,
        duration_ticks: 3,
        reach: ReachBand { min: Reach::Clinch, max: Reach::Far },
        overlay_bonus: Some(1.1),
    }
}

fn retreat() -> Technique {
    Technique {
        attack_mode: AttackMode::None,
        channels: Channels::FOOTWORK,
        guard_height: GuardHeight::Low,
        duration_ticks: 3,
        reach: ReachBand { min: Reach::Clinch, max: Reach::Far },
        overlay_bonus: Some(0.9),
    }
}

fn parry() -> Technique {
    Technique {
        attack_mode: AttackMode::None,
        channels: Channels::WEAPON,
        guard_height: GuardHeight::Mid,
        duration_ticks: 2,
        reach: ReachBand { min: Reach::Clinch, max: Reach::Longsword },
        overlay_bonus: None,
    }
}

fn block() -> Technique {
    Technique {
        attack_mode: AttackMode::None,
        channels: Channels::OFF_HAND,
        guard_height: GuardHeight::High,
        duration_ticks: 2,
        reach: ReachBand { min: Reach::Clinch, max: Reach::Spear },
        overlay_bonus: None,
    }
}

fn dodge() -> Technique {
    Technique {
        attack_mode: AttackMode::None,
        channels: Channels::FOOTWORK,
        guard_height: GuardHeight::Low,
        duration_ticks: 2,
        reach: ReachBand { min: Reach::Clinch, max: Reach::Far },
        overlay_bonus: None,
    }
}

fn feint() -> Technique {
    Technique {
        attack_mode: AttackMode::Thrust,
        channels: Channels::WEAPON | Channels::CONCENTRATION,
        guard_height: GuardHeight::Mid,
        duration_ticks: 3,
        reach: ReachBand { min: Reach::Clinch, max: Reach::Sabre },
        overlay_bonus: None,
    }
}

fn riposte() -> Technique {
    Technique {
        attack_mode: AttackMode::Thrust,
        channels: Channels::WEAPON | Channels::CONCENTRATION,
        guard_height: GuardHeight::Mid,
        duration_ticks: 2,
        reach: ReachBand { min: Reach::Clinch, max: Reach::Dagger },
        overlay_bonus: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_listed_ids_resolve() {
        for id in ALL {
            assert!(get_technique(&TechniqueId::from(*id)).is_some(), "missing technique {id}");
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(get_technique(&TechniqueId::from("nonexistent")).is_none());
    }
}
