//! Body & armour model — parts form a tree; wounds index into a part's
//! tissue stack; nothing here holds a pointer, only indices into `Body.parts`.

use serde::{Deserialize, Serialize};

use crate::enums::{PartTag, Severity, Side, TissueLayer, WoundKind};

/// One tissue layer instance within a part's stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    pub layer: TissueLayer,
    /// Remaining structural integrity in `[0, 1]`.
    pub integrity: f32,
}

/// A node in the body tree. `parent` is `None` only for the root (torso),
/// which a correct implementation never marks `.missing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub tag: PartTag,
    pub side: Side,
    pub parent: Option<usize>,
    pub can_grasp: bool,
    pub can_stand: bool,
    pub can_see: bool,
    pub can_hear: bool,
    pub tissue: Vec<LayerState>,
    pub severity: Severity,
    pub has_artery: bool,
    /// Multiplies pain/trauma accumulated by wounds to this part.
    pub trauma_mult: f32,
}

impl Part {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A wound record — one per penetrating hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wound {
    pub kind: WoundKind,
    pub part_index: usize,
    /// Index into `Part.tissue` of the deepest layer reached. Must always
    /// satisfy `deepest_layer_index < part.tissue.len()`.
    pub deepest_layer_index: usize,
    pub bleeding_rate: f32,
    pub artery_hit: bool,
}

/// A full body: an arena of `Part`s forming a tree rooted at index 0, and
/// the wounds currently open on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub parts: Vec<Part>,
    pub wounds: Vec<Wound>,
}

impl Body {
    pub fn root_index(&self) -> usize {
        0
    }

    /// Scores used across the resolution and physiology subsystems.
    pub fn grasp_strength(&self, hand_part_index: usize) -> f32 {
        let part = &self.parts[hand_part_index];
        match part.severity {
            Severity::None => 1.0,
            Severity::Minor => 0.75,
            Severity::Inhibited => 0.5,
            Severity::Disabled => 0.25,
            Severity::Broken | Severity::Missing => 0.0,
        }
    }

    pub fn mobility_score(&self) -> f32 {
        let legs: Vec<&Part> = self
            .parts
            .iter()
            .filter(|p| p.tag == PartTag::Limb && p.can_stand)
            .collect();
        if legs.is_empty() {
            return 1.0;
        }
        let functional = legs
            .iter()
            .filter(|p| !matches!(p.severity, Severity::Broken | Severity::Missing))
            .count();
        functional as f32 / legs.len() as f32
    }

    pub fn vision_score(&self) -> f32 {
        self.sense_score(PartTag::Eye, |p| p.can_see)
    }

    pub fn hearing_score(&self) -> f32 {
        // Ears aren't a distinct PartTag in this body plan; hearing is
        // modeled on the head part's can_hear capability directly.
        self.sense_score(PartTag::Head, |p| p.can_hear)
    }

    fn sense_score(&self, tag: PartTag, capability: impl Fn(&Part) -> bool) -> f32 {
        let organs: Vec<&Part> = self.parts.iter().filter(|p| p.tag == tag).collect();
        if organs.is_empty() {
            return 1.0;
        }
        let working = organs
            .iter()
            .filter(|p| capability(p) && !matches!(p.severity, Severity::Broken | Severity::Missing))
            .count();
        working as f32 / organs.len() as f32
    }

    /// Orphan any part whose ancestry chain no longer reaches the root
    /// (i.e. an ancestor was severed), marking it `.missing`. Never touches
    /// the root itself.
    pub fn orphan_subtree(&mut self, severed_index: usize) -> Vec<usize> {
        let mut orphaned = Vec::new();
        if self.parts[severed_index].is_root() {
            return orphaned;
        }
        for i in 0..self.parts.len() {
            if i == severed_index {
                continue;
            }
            if self.is_descendant_of(i, severed_index) {
                self.parts[i].severity = Severity::Missing;
                orphaned.push(i);
            }
        }
        orphaned
    }

    fn is_descendant_of(&self, candidate: usize, ancestor: usize) -> bool {
        let mut cur = self.parts[candidate].parent;
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parts[p].parent;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
            has_artery: true,
            trauma_mult: 1.0,
        }
    }

    fn arm(parent: usize) -> Part {
        Part {
            tag: PartTag::Limb,
            side: Side::Left,
            parent: Some(parent),
            can_grasp: true,
            can_stand: false,
            can_see: false,
            can_hear: false,
            tissue: vec![LayerState { layer: TissueLayer::Bone, integrity: 1.0 }],
            severity: Severity::None,
            has_artery: false,
            trauma_mult: 0.8,
        }
    }

    #[test]
    fn root_is_never_orphaned() {
        let mut body = Body { parts: vec![torso()], wounds: vec![] };
        let orphaned = body.orphan_subtree(0);
        assert!(orphaned.is_empty());
        assert_eq!(body.parts[0].severity, Severity::None);
    }

    #[test]
    fn severing_ancestor_orphans_descendants() {
        let mut body = Body {
            parts: vec![torso(), arm(0)],
            wounds: vec![],
        };
        let orphaned = body.orphan_subtree(0);
        assert_eq!(orphaned, vec![1]);
        assert_eq!(body.parts[1].severity, Severity::Missing);
    }

    #[test]
    fn grasp_strength_zero_when_hand_missing() {
        let mut hand = arm(0);
        hand.severity = Severity::Missing;
        let body = Body { parts: vec![torso(), hand], wounds: vec![] };
        assert_eq!(body.grasp_strength(1), 0.0);
    }
}
