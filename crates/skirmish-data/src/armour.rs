//! Armour template table. Each piece covers a set of body-part tags with an
//! outside-in stack of layers the resolution engine traverses on a hit.

use skirmish_types::{ArmourId, PartTag};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmourLayer {
    /// Incoming energy below this threshold is fully deflected.
    pub deflect_threshold: f32,
    /// Energy absorbed (never reaches the next layer) on a non-deflected hit.
    pub absorb: f32,
    /// Chance per hit that this layer simply has no coverage at the struck
    /// point (a buckle, a gap at the armpit) and is skipped entirely.
    pub coverage_gap_chance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArmourDefinition {
    pub id_str: &'static str,
    pub display_name: &'static str,
    pub covers: &'static [PartTag],
    pub layers: &'static [ArmourLayer],
}

pub fn get_armour(id: &ArmourId) -> Option<ArmourDefinition> {
    match id.as_str() {
        "armour.plate_cuirass" => Some(ArmourDefinition {
            id_str: "armour.plate_cuirass",
            display_name: "Plate Cuirass",
            covers: &[PartTag::Torso],
            layers: &[
                ArmourLayer { deflect_threshold: 4.0, absorb: 3.0, coverage_gap_chance: 0.05 },
                ArmourLayer { deflect_threshold: 1.0, absorb: 1.5, coverage_gap_chance: 0.0 },
            ],
        }),
        "armour.leather_jerkin" => Some(ArmourDefinition {
            id_str: "armour.leather_jerkin",
            display_name: "Leather Jerkin",
            covers: &[PartTag::Torso],
            layers: &[ArmourLayer { deflect_threshold: 1.0, absorb: 1.0, coverage_gap_chance: 0.15 }],
        }),
        "armour.open_helm" => Some(ArmourDefinition {
            id_str: "armour.open_helm",
            display_name: "Open Helm",
            covers: &[PartTag::Head],
            layers: &[ArmourLayer { deflect_threshold: 2.0, absorb: 1.0, coverage_gap_chance: 0.35 }],
        }),
        "armour.gauntlets" => Some(ArmourDefinition {
            id_str: "armour.gauntlets",
            display_name: "Gauntlets",
            covers: &[PartTag::Hand],
            layers: &[ArmourLayer { deflect_threshold: 1.5, absorb: 0.5, coverage_gap_chance: 0.1 }],
        }),
        _ => None,
    }
}

pub const ALL: &[&str] =
    &["armour.plate_cuirass", "armour.leather_jerkin", "armour.open_helm", "armour.gauntlets"];
