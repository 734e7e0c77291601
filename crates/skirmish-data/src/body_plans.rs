//! Body plan templates — each builds a fresh `Body` tree rooted at the
//! torso. Indices are fixed per plan so resolution code can refer to, e.g.,
//! "the humanoid's dominant hand" without re-walking the tree each time.

use skirmish_types::{Body, BodyPlanId, LayerState, Part, Severity, Side, TissueLayer};

fn layer(layer: TissueLayer) -> LayerState {
    LayerState { layer, integrity: 1.0 }
}

fn part(
    tag: skirmish_types::PartTag,
    side: Side,
    parent: Option<usize>,
    tissue: Vec<LayerState>,
    has_artery: bool,
    trauma_mult: f32,
) -> Part {
    Part {
        tag,
        side,
        parent,
        can_grasp: tag == skirmish_types::PartTag::Hand,
        can_stand: tag == skirmish_types::PartTag::Limb && side != Side::Centre,
        can_see: tag == skirmish_types::PartTag::Eye,
        can_hear: tag == skirmish_types::PartTag::Head,
        tissue,
        severity: Severity::None,
        has_artery,
        trauma_mult,
    }
}

/// Indices into the `humanoid` plan's `Body.parts`, named for resolution
/// code that needs to find "the torso" or "the dominant hand" without
/// re-walking the tree.
pub mod humanoid_index {
    pub const TORSO: usize = 0;
    pub const NECK: usize = 1;
    pub const HEAD: usize = 2;
    pub const EYE_LEFT: usize = 3;
    pub const EYE_RIGHT: usize = 4;
    pub const ARM_LEFT: usize = 5;
    pub const HAND_LEFT: usize = 6;
    pub const ARM_RIGHT: usize = 7;
    pub const HAND_RIGHT: usize = 8;
    pub const LEG_LEFT: usize = 9;
    pub const LEG_RIGHT: usize = 10;
}

fn humanoid() -> Body {
    use skirmish_types::PartTag::*;
    use humanoid_index::*;

    // Pushed in index order — TORSO is pushed first and lands at index 0,
    // and so on, matching the constants in `humanoid_index`.
    let mut parts = Vec::with_capacity(11);
    parts.push(part(
        Torso,
        Side::Centre,
        None,
        vec![layer(TissueLayer::Skin), layer(TissueLayer::Fat), layer(TissueLayer::Muscle), layer(TissueLayer::Bone), layer(TissueLayer::Organ)],
        true,
        1.0,
    ));
    parts.push(part(
        Neck,
        Side::Centre,
        Some(TORSO),
        vec![layer(TissueLayer::Skin), layer(TissueLayer::Muscle), layer(TissueLayer::Nerve)],
        true,
        1.5,
    ));
    parts.push(part(
        Head,
        Side::Centre,
        Some(NECK),
        vec![layer(TissueLayer::Skin), layer(TissueLayer::Bone), layer(TissueLayer::Organ)],
        false,
        1.3,
    ));
    parts.push(part(Eye, Side::Left, Some(HEAD), vec![layer(TissueLayer::Organ)], false, 0.8));
    parts.push(part(Eye, Side::Right, Some(HEAD), vec![layer(TissueLayer::Organ)], false, 0.8));
    parts.push(part(
        Limb,
        Side::Left,
        Some(TORSO),
        vec![layer(TissueLayer::Skin), layer(TissueLayer::Muscle), layer(TissueLayer::Bone)],
        false,
        0.7,
    ));
    parts.push(part(
        Hand,
        Side::Left,
        Some(ARM_LEFT),
        vec![layer(TissueLayer::Skin), layer(TissueLayer::Tendon), layer(TissueLayer::Bone)],
        false,
        0.5,
    ));
    parts.push(part(
        Limb,
        Side::Right,
        Some(TORSO),
        vec![layer(TissueLayer::Skin), layer(TissueLayer::Muscle), layer(TissueLayer::Bone)],
        false,
        0.7,
    ));
    parts.push(part(
        Hand,
        Side::Right,
        Some(ARM_RIGHT),
        vec![layer(TissueLayer::Skin), layer(TissueLayer::Tendon), layer(TissueLayer::Bone)],
        false,
        0.5,
    ));
    parts.push(part(
        Limb,
        Side::Left,
        Some(TORSO),
        vec![layer(TissueLayer::Skin), layer(TissueLayer::Muscle), layer(TissueLayer::Bone)],
        true,
        0.9,
    ));
    parts.push(part(
        Limb,
        Side::Right,
        Some(TORSO),
        vec![layer(TissueLayer::Skin), layer(TissueLayer::Muscle), layer(TissueLayer::Bone)],
        true,
        0.9,
    ));

    debug_assert_eq!(parts.len(), 11);
    Body { parts, wounds: Vec::new() }
}

pub fn build_body(id: &BodyPlanId) -> Option<Body> {
    match id.as_str() {
        "humanoid" => Some(humanoid()),
        _ => None,
    }
}

pub const ALL: &[&str] = &["humanoid"];
