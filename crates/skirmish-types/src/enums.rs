//! Small closed vocabularies shared across the engine.
//!
//! Bitflag sets (`Channels`, `CardTags`, `PlayableFrom`) serialize as their
//! raw bits rather than deriving through the `bitflags` macro's default impl,
//! keeping wire shape independent of internal representation.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// =============================================================================
// Reach / Range
// =============================================================================

/// Abstract distance between two agents, ordered closest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reach {
    Clinch,
    Dagger,
    Sabre,
    Longsword,
    Spear,
    Near,
    Medium,
    Far,
}

impl Reach {
    pub const ALL: [Reach; 8] = [
        Reach::Clinch,
        Reach::Dagger,
        Reach::Sabre,
        Reach::Longsword,
        Reach::Spear,
        Reach::Near,
        Reach::Medium,
        Reach::Far,
    ];

    /// Step one reach band closer, saturating at `Clinch`.
    pub fn closer(self) -> Reach {
        Self::ALL[self.index().saturating_sub(1)]
    }

    /// Step one reach band further, saturating at `Far`.
    pub fn farther(self) -> Reach {
        let i = (self.index() + 1).min(Self::ALL.len() - 1);
        Self::ALL[i]
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&r| r == self).unwrap()
    }

    /// Step `delta` bands (negative = closer), saturating at both ends.
    pub fn step(self, delta: i32) -> Reach {
        let i = (self.index() as i32 + delta).clamp(0, Self::ALL.len() as i32 - 1);
        Self::ALL[i as usize]
    }
}

// =============================================================================
// Channels — timeline resource lanes
// =============================================================================

bitflags! {
    /// Resource lanes a play can occupy. Two overlapping time slots conflict
    /// iff their channel masks intersect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Channels: u8 {
        const WEAPON        = 0b0001;
        const OFF_HAND      = 0b0010;
        const FOOTWORK      = 0b0100;
        const CONCENTRATION = 0b1000;
    }
}

impl Channels {
    /// `conflicts(empty) == false`; conflict is intersection, so it is
    /// symmetric by construction.
    pub fn conflicts(self, other: Channels) -> bool {
        self.intersects(other)
    }
}

impl Serialize for Channels {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Channels {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Ok(Channels::from_bits_truncate(bits))
    }
}

// =============================================================================
// Card tags
// =============================================================================

bitflags! {
    /// Classification bits carried by a template; rule predicates and phase
    /// validation both read this mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CardTags: u32 {
        const OFFENSIVE       = 1 << 0;
        const DEFENSIVE       = 1 << 1;
        const MANOEUVRE       = 1 << 2;
        const REACTION        = 1 << 3;
        const MODIFIER        = 1 << 4;
        const PRECISION       = 1 << 5;
        const FINESSE         = 1 << 6;
        const INVOLUNTARY     = 1 << 7;
        const PHASE_SELECTION = 1 << 8;
        const PHASE_COMMIT    = 1 << 9;
    }
}

impl Serialize for CardTags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CardTags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Ok(CardTags::from_bits_truncate(bits))
    }
}

bitflags! {
    /// Source a template may legally be played from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PlayableFrom: u8 {
        const HAND        = 1 << 0;
        const POOL        = 1 << 1;
        const SPELLS      = 1 << 2;
        const EQUIPPED    = 1 << 3;
        const INVENTORY   = 1 << 4;
        const ENVIRONMENT = 1 << 5;
    }
}

impl Serialize for PlayableFrom {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PlayableFrom {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Ok(PlayableFrom::from_bits_truncate(bits))
    }
}

// =============================================================================
// Technique
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackMode {
    Thrust,
    Swing,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardHeight {
    Low,
    Mid,
    High,
}

// =============================================================================
// Stakes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stakes {
    Probing,
    Guarded,
    Committed,
    Reckless,
}

// =============================================================================
// Side / laterality
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Centre,
}

// =============================================================================
// Draw style
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawStyle {
    ShuffledDeck,
    AlwaysAvailable,
    Scripted,
}

// =============================================================================
// Zones
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Draw,
    Hand,
    Discard,
    InPlay,
    Exhaust,
    Environment,
}

// =============================================================================
// Resources
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Stamina,
    Focus,
}

// =============================================================================
// Body
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartTag {
    Head,
    Eye,
    Neck,
    Torso,
    Limb,
    Hand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TissueLayer {
    Skin,
    Fat,
    Muscle,
    Tendon,
    Nerve,
    Bone,
    Organ,
}

/// Damage progression for a single tissue layer, worst-last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Minor,
    Inhibited,
    Disabled,
    Broken,
    Missing,
}

impl Severity {
    const ORDER: [Severity; 6] = [
        Severity::None,
        Severity::Minor,
        Severity::Inhibited,
        Severity::Disabled,
        Severity::Broken,
        Severity::Missing,
    ];

    /// Flip up one step, saturating at `Missing`.
    pub fn step_up(self) -> Severity {
        let i = Self::ORDER.iter().position(|&s| s == self).unwrap();
        Self::ORDER[(i + 1).min(Self::ORDER.len() - 1)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WoundKind {
    Slash,
    Pierce,
    Bludgeon,
}

// =============================================================================
// Engagement
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementAxis {
    Pressure,
    Control,
    Position,
    Balance,
}

// =============================================================================
// Comparisons for predicate leaves
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl ComparisonOp {
    pub fn eval(self, lhs: f32, rhs: f32) -> bool {
        match self {
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::Le => lhs <= rhs,
            ComparisonOp::Eq => (lhs - rhs).abs() < f32::EPSILON,
            ComparisonOp::Ge => lhs >= rhs,
            ComparisonOp::Gt => lhs > rhs,
        }
    }
}

// =============================================================================
// Conditions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Incapacitated,
    Blinded,
    Deafened,
    Winded,
    Bleeding,
    HypovolemicShock,
    AdrenalineSurge,
    AdrenalineCrash,
    Flanked,
    Surrounded,
    Pressured,
    Controlled,
    Pain,
    Trauma,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reach_is_ordered_closest_first() {
        assert!(Reach::Clinch < Reach::Dagger);
        assert!(Reach::Spear < Reach::Far);
    }

    #[test]
    fn reach_step_saturates() {
        assert_eq!(Reach::Clinch.closer(), Reach::Clinch);
        assert_eq!(Reach::Far.farther(), Reach::Far);
        assert_eq!(Reach::Near.step(-10), Reach::Clinch);
        assert_eq!(Reach::Near.step(10), Reach::Far);
    }

    #[test]
    fn channels_conflict_empty_is_false() {
        assert!(!Channels::WEAPON.conflicts(Channels::empty()));
    }

    #[test]
    fn channels_conflict_symmetric() {
        let a = Channels::WEAPON | Channels::FOOTWORK;
        let b = Channels::FOOTWORK | Channels::CONCENTRATION;
        assert_eq!(a.conflicts(b), b.conflicts(a));
        assert!(a.conflicts(b));
        assert!(!Channels::WEAPON.conflicts(Channels::OFF_HAND));
    }

    #[test]
    fn severity_step_up_saturates_at_missing() {
        assert_eq!(Severity::Missing.step_up(), Severity::Missing);
        assert_eq!(Severity::None.step_up(), Severity::Minor);
    }
}
