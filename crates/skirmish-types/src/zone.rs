//! Card instances and the zone sequences that track where they live.
//!
//! Every instance ID is owned exclusively by the card registry (in
//! `skirmish-engine`) and appears in exactly one zone, persistent collection,
//! or the environment at any instant. This module defines only the shapes;
//! the registry that enforces the one-zone invariant lives in the engine.

use serde::{Deserialize, Serialize};

use crate::ids::CardId;
use crate::registry::{AgentId, CardInstanceId};

/// A live card, bound to its static `Template` by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInstance {
    pub id: CardInstanceId,
    pub template: CardId,
    pub upgrade_level: u32,
    /// Ticks remaining before this instance is playable again, if any.
    pub cooldown: Option<u32>,
}

impl CardInstance {
    pub fn new(id: CardInstanceId, template: CardId) -> Self {
        Self { id, template, upgrade_level: 0, cooldown: None }
    }
}

/// One agent's ordered per-zone instance lists for an encounter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneSet {
    pub draw: Vec<CardInstanceId>,
    pub hand: Vec<CardInstanceId>,
    pub discard: Vec<CardInstanceId>,
    pub in_play: Vec<CardInstanceId>,
    pub exhaust: Vec<CardInstanceId>,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single zone list matching `crate::enums::Zone`, excluding
    /// `Environment` (which is encounter-scoped, not per-agent — see
    /// `EnvironmentZone`).
    pub fn list(&self, zone: crate::enums::Zone) -> Option<&Vec<CardInstanceId>> {
        match zone {
            crate::enums::Zone::Draw => Some(&self.draw),
            crate::enums::Zone::Hand => Some(&self.hand),
            crate::enums::Zone::Discard => Some(&self.discard),
            crate::enums::Zone::InPlay => Some(&self.in_play),
            crate::enums::Zone::Exhaust => Some(&self.exhaust),
            crate::enums::Zone::Environment => None,
        }
    }

    pub fn list_mut(&mut self, zone: crate::enums::Zone) -> Option<&mut Vec<CardInstanceId>> {
        match zone {
            crate::enums::Zone::Draw => Some(&mut self.draw),
            crate::enums::Zone::Hand => Some(&mut self.hand),
            crate::enums::Zone::Discard => Some(&mut self.discard),
            crate::enums::Zone::InPlay => Some(&mut self.in_play),
            crate::enums::Zone::Exhaust => Some(&mut self.exhaust),
            crate::enums::Zone::Environment => None,
        }
    }

    pub fn contains(&self, id: CardInstanceId) -> bool {
        self.draw.contains(&id)
            || self.hand.contains(&id)
            || self.discard.contains(&id)
            || self.in_play.contains(&id)
            || self.exhaust.contains(&id)
    }
}

/// The encounter-scoped environment zone: thrown or dropped instances not
/// currently owned by any agent's `ZoneSet`, tracked back to whoever threw
/// them (for retrieval or "return to owner" effects).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentZone {
    pub instances: Vec<CardInstanceId>,
    pub thrown_by: std::collections::BTreeMap<CardInstanceId, AgentId>,
}

impl EnvironmentZone {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Zone;

    #[test]
    fn list_excludes_environment() {
        let zones = ZoneSet::new();
        assert!(zones.list(Zone::Environment).is_none());
        assert!(zones.list(Zone::Hand).is_some());
    }

    #[test]
    fn contains_checks_every_zone() {
        let mut zones = ZoneSet::new();
        let id = CardInstanceId::new(4, 0);
        zones.hand.push(id);
        assert!(zones.contains(id));
        assert!(!zones.contains(CardInstanceId::new(5, 0)));
    }
}
