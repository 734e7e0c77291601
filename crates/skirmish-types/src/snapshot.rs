//! The query boundary: an immutable, on-demand view of combat state for
//! external collaborators (frontend, AI) to render or reason about without
//! touching the mutable world directly.

use serde::{Deserialize, Serialize};

use crate::enums::{Channels, GuardHeight, Reach, Stakes};
use crate::ids::CardId;
use crate::registry::AgentId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardStatus {
    pub card_id: CardId,
    pub playable: bool,
    /// Populated when `playable` is false.
    pub reason: Option<String>,
    pub cost_stamina: u32,
    pub cost_focus: u32,
    pub requires_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySummary {
    pub play_index: usize,
    pub start: f32,
    pub end: f32,
    pub channels: Channels,
    pub stakes: Stakes,
    /// `(candidate_height, would_conflict)` pairs describing whether
    /// attaching a modifier at that guard height would clash with the lead
    /// play's own height commitment.
    pub modifier_attachability: Vec<(GuardHeight, bool)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySummary {
    pub id: AgentId,
    pub range: Reach,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub stamina_current: f32,
    pub stamina_max: f32,
    pub focus_current: f32,
    pub focus_max: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub phase: String,
    pub cards: Vec<CardStatus>,
    pub plays: Vec<PlaySummary>,
    pub enemies: Vec<EnemySummary>,
    pub resources: ResourceSnapshot,
}

impl CombatSnapshot {
    /// Would attaching a modifier card at `height` to the play at
    /// `play_index` cause a guard-height conflict? Looked up from the
    /// precomputed `modifier_attachability` table rather than recomputed —
    /// the snapshot is meant to answer this without touching the world.
    pub fn would_conflict(&self, play_index: usize, height: GuardHeight) -> Option<bool> {
        let play = self.plays.iter().find(|p| p.play_index == play_index)?;
        play.modifier_attachability
            .iter()
            .find(|(h, _)| *h == height)
            .map(|(_, conflict)| *conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn would_conflict_looks_up_precomputed_table() {
        let snapshot = CombatSnapshot {
            phase: "commit".into(),
            cards: vec![],
            plays: vec![PlaySummary {
                play_index: 0,
                start: 0.0,
                end: 0.3,
                channels: Channels::WEAPON,
                stakes: Stakes::Guarded,
                modifier_attachability: vec![(GuardHeight::High, true), (GuardHeight::Low, false)],
            }],
            enemies: vec![],
            resources: ResourceSnapshot {
                stamina_current: 5.0,
                stamina_max: 10.0,
                focus_current: 2.0,
                focus_max: 3.0,
            },
        };
        assert_eq!(snapshot.would_conflict(0, GuardHeight::High), Some(true));
        assert_eq!(snapshot.would_conflict(0, GuardHeight::Low), Some(false));
        assert_eq!(snapshot.would_conflict(1, GuardHeight::Low), None);
    }
}
