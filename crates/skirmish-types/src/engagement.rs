//! Engagement — the symmetric state between a pair of agents: range plus
//! four advantage axes in `[-1, 1]`. The map that owns these is keyed on a
//! canonicalised (lower id first) pair so `engagement(a, b) == engagement(b, a)`
//! trivially by construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::Reach;
use crate::registry::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub range: Reach,
    pub pressure: f32,
    pub control: f32,
    pub position: f32,
    pub balance_a: f32,
    pub balance_b: f32,
}

impl Engagement {
    pub fn neutral(range: Reach) -> Self {
        Self {
            range,
            pressure: 0.0,
            control: 0.0,
            position: 0.0,
            balance_a: 0.0,
            balance_b: 0.0,
        }
    }

    pub fn clamp_axes(&mut self) {
        self.pressure = self.pressure.clamp(-1.0, 1.0);
        self.control = self.control.clamp(-1.0, 1.0);
        self.position = self.position.clamp(-1.0, 1.0);
        self.balance_a = self.balance_a.clamp(-1.0, 1.0);
        self.balance_b = self.balance_b.clamp(-1.0, 1.0);
    }
}

/// Canonicalise a pair of agent ids so the lower-sorting id is always first.
pub fn canonical_pair(a: &AgentId, b: &AgentId) -> (AgentId, AgentId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Per-encounter map of engagements, always stored under canonicalised keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementMap {
    pairs: BTreeMap<(AgentId, AgentId), Engagement>,
}

impl EngagementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, a: &AgentId, b: &AgentId) -> Option<&Engagement> {
        let key = canonical_pair(a, b);
        self.pairs.get(&key)
    }

    pub fn get_mut(&mut self, a: &AgentId, b: &AgentId) -> Option<&mut Engagement> {
        let key = canonical_pair(a, b);
        self.pairs.get_mut(&key)
    }

    pub fn set(&mut self, a: &AgentId, b: &AgentId, engagement: Engagement) {
        let key = canonical_pair(a, b);
        self.pairs.insert(key, engagement);
    }

    pub fn entry_or_neutral(&mut self, a: &AgentId, b: &AgentId, default_range: Reach) -> &mut Engagement {
        let key = canonical_pair(a, b);
        self.pairs.entry(key).or_insert_with(|| Engagement::neutral(default_range))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(AgentId, AgentId), &Engagement)> {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_symmetric() {
        let a = AgentId::new(7, 0);
        let b = AgentId::new(2, 0);
        assert_eq!(canonical_pair(&a, &b), canonical_pair(&b, &a));
    }

    #[test]
    fn map_lookup_symmetric() {
        let mut map = EngagementMap::new();
        let a = AgentId::new(0, 0);
        let b = AgentId::new(1, 0);
        map.set(&a, &b, Engagement::neutral(Reach::Sabre));
        assert_eq!(map.get(&a, &b), map.get(&b, &a));
    }

    #[test]
    fn engagement_lookup_is_symmetric_for_arbitrary_ids_and_axes() {
        use proptest::prelude::*;
        proptest!(|(
            a_index in 0u32..20,
            b_index in 0u32..20,
            pressure in -1.0f32..1.0,
            control in -1.0f32..1.0,
        )| {
            let a = AgentId::new(a_index, 0);
            let b = AgentId::new(b_index, 0);
            let mut map = EngagementMap::new();
            let mut engagement = Engagement::neutral(Reach::Sabre);
            engagement.pressure = pressure;
            engagement.control = control;
            map.set(&a, &b, engagement);
            prop_assert_eq!(map.get(&a, &b), map.get(&b, &a));
        });
    }
}
