//! Static template shapes — card definitions and the technique they embed.
//!
//! Templates themselves live as data in `skirmish-data`; this module only
//! defines the shape every template conforms to.

use serde::{Deserialize, Serialize};

use crate::enums::{AttackMode, CardTags, GuardHeight, PlayableFrom, Reach};
use crate::ids::CardId;
use crate::rule::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Signature,
}

/// What a card costs to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cost {
    pub stamina: u32,
    pub focus: u32,
    /// Duration occupied on the timeline, in 0.1s ticks (1-10).
    pub time: u32,
}

impl Cost {
    pub const FREE: Cost = Cost { stamina: 0, focus: 0, time: 0 };
}

/// An inclusive `[min, max]` reach band a technique is usable within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReachBand {
    pub min: Reach,
    pub max: Reach,
}

impl ReachBand {
    pub fn contains(self, r: Reach) -> bool {
        self.min <= r && r <= self.max
    }
}

/// A weapon technique embedded in a template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub attack_mode: AttackMode,
    pub channels: crate::enums::Channels,
    pub guard_height: GuardHeight,
    /// Duration in 0.1s ticks.
    pub duration_ticks: u32,
    pub reach: ReachBand,
    /// Damage multiplier contributed to overlapping weapon-channel plays
    /// when this is a footwork-channel technique (e.g. `advance`).
    pub overlay_bonus: Option<f32>,
}

/// Static, immutable card definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: CardId,
    pub display_name: &'static str,
    pub rarity: Rarity,
    pub cost: Cost,
    pub tags: CardTags,
    pub playable_from: PlayableFrom,
    pub combat_playable: bool,
    pub technique: Option<Technique>,
    pub rules: Vec<Rule>,
}
