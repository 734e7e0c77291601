//! Weapon template table. Weapons don't carry their own `Technique` — the
//! card(s) that make them usable do — but they gate which reaches and
//! channels those techniques are actually effective at.

use skirmish_types::{Channels, Reach, ReachBand, WeaponId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponDefinition {
    pub id_str: &'static str,
    pub display_name: &'static str,
    /// The dotted id's prefix (`"daggers"`, `"swords"`, ...) — what
    /// `Predicate::WeaponCategory` matches against.
    pub category: &'static str,
    pub reach: ReachBand,
    pub accuracy: f32,
    pub base_damage: f32,
    pub channels: Channels,
}

pub fn get_weapon(id: &WeaponId) -> Option<WeaponDefinition> {
    match id.as_str() {
        "daggers.dirk" => Some(WeaponDefinition {
            id_str: "daggers.dirk",
            display_name: "Dirk",
            category: "daggers",
            reach: ReachBand { min: Reach::Clinch, max: Reach::Dagger },
            accuracy: 0.85,
            base_damage: 3.0,
            channels: Channels::WEAPON,
        }),
        "swords.knights_sword" => Some(WeaponDefinition {
            id_str: "swords.knights_sword",
            display_name: "Knight's Sword",
            category: "swords",
            reach: ReachBand { min: Reach::Dagger, max: Reach::Longsword },
            accuracy: 0.75,
            base_damage: 6.0,
            channels: Channels::WEAPON,
        }),
        "spears.boar_spear" => Some(WeaponDefinition {
            id_str: "spears.boar_spear",
            display_name: "Boar Spear",
            category: "spears",
            reach: ReachBand { min: Reach::Sabre, max: Reach::Spear },
            accuracy: 0.7,
            base_damage: 7.0,
            channels: Channels::WEAPON | Channels::OFF_HAND,
        }),
        "bucklers.iron_buckler" => Some(WeaponDefinition {
            id_str: "bucklers.iron_buckler",
            display_name: "Iron Buckler",
            category: "bucklers",
            reach: ReachBand { min: Reach::Clinch, max: Reach::Sabre },
            accuracy: 0.0,
            base_damage: 0.0,
            channels: Channels::OFF_HAND,
        }),
        _ => None,
    }
}

pub const ALL: &[&str] =
    &["daggers.dirk", "swords.knights_sword", "spears.boar_spear", "bucklers.iron_buckler"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_listed_ids_resolve() {
        for id in ALL {
            assert!(get_weapon(&WeaponId::from(*id)).is_some(), "missing weapon {id}");
        }
    }

    #[test]
    fn buckler_has_no_reach_offense() {
        let buckler = get_weapon(&WeaponId::from("bucklers.iron_buckler")).unwrap();
        assert_eq!(buckler.base_damage, 0.0);
    }
}
