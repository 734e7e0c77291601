//! Per-agent per-tick timeline — a fixed-capacity slot grid at 0.1s
//! granularity. Slots may overlap in time as long as their channels don't.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::enums::{Channels, Stakes};
use crate::registry::{AgentId, CardInstanceId};

/// Maximum simultaneous slots an agent's timeline can hold in one tick.
/// Four channels, at most one occupying play each, leaves headroom for
/// overcommitted plays spilling a channel's second slot.
pub const MAX_TIMELINE_SLOTS: usize = 8;

/// Maximum cards stacked as modifiers onto a single play.
pub const MAX_MODIFIER_STACK: usize = 4;

/// A committed action (lead card plus optional modifier stack) on the
/// timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub action: CardInstanceId,
    pub modifier_stack: ArrayVec<CardInstanceId, MAX_MODIFIER_STACK>,
    pub stakes: Stakes,
    pub target: Option<AgentId>,
    pub added_in_commit: bool,
    pub reinforcements: Vec<CardInstanceId>,
}

impl Play {
    pub fn new(action: CardInstanceId, stakes: Stakes) -> Self {
        Self {
            action,
            modifier_stack: ArrayVec::new(),
            stakes,
            target: None,
            added_in_commit: false,
            reinforcements: Vec::new(),
        }
    }
}

/// One occupied interval on a timeline, `start` and `end` both in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: f32,
    pub end: f32,
    pub channels: Channels,
    pub play: Play,
}

impl TimeSlot {
    pub fn duration(&self) -> f32 {
        self.end - self.start
    }

    fn overlaps(&self, start: f32, end: f32) -> bool {
        self.start < end && start < self.end
    }
}

/// A single agent's slot grid for the current tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    slots: ArrayVec<TimeSlot, MAX_TIMELINE_SLOTS>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Ascending-`start` view, used by the resolution engine's time-ordered
    /// iteration (ties are broken by the caller using owner id + index).
    pub fn slots_time_ordered(&self) -> Vec<&TimeSlot> {
        let mut ordered: Vec<&TimeSlot> = self.slots.iter().collect();
        ordered.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap());
        ordered
    }

    /// True if a slot of the given channels and interval can be inserted
    /// without a channel conflict against any time-overlapping existing slot.
    /// Does not itself enforce `start + duration <= 1.0` — overcommit is a
    /// caller-level decision (reserved into the next tick with a penalty
    /// flag), so this only checks channel disjointness.
    pub fn can_insert(&self, start: f32, duration: f32, channels: Channels) -> bool {
        let end = start + duration;
        !self
            .slots
            .iter()
            .any(|s| s.overlaps(start, end) && s.channels.conflicts(channels))
    }

    /// Appends at the next free index; returns the stable index assigned
    /// (kept stable for later modifier stacking) or `None` if the timeline
    /// is at capacity.
    pub fn insert(&mut self, slot: TimeSlot) -> Option<usize> {
        if self.slots.is_full() {
            return None;
        }
        self.slots.push(slot);
        Some(self.slots.len() - 1)
    }

    /// O(n) shift-remove. Leaves gaps in time — does not re-pack.
    pub fn remove(&mut self, index: usize) -> Option<TimeSlot> {
        if index >= self.slots.len() {
            return None;
        }
        Some(self.slots.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&TimeSlot> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TimeSlot> {
        self.slots.get_mut(index)
    }

    /// Earliest 0.1-snapped start at or after `from` where `can_insert`
    /// holds, scanning up to the tick boundary.
    pub fn next_available_start(&self, from: f32, duration: f32, channels: Channels) -> Option<f32> {
        let mut start = snap(from);
        while start + duration <= 1.0 + f32::EPSILON {
            if self.can_insert(start, duration, channels) {
                return Some(start);
            }
            start += 0.1;
        }
        None
    }

    /// Sum of reserved durations across all current slots.
    pub fn reserved_time(&self) -> f32 {
        self.slots.iter().map(|s| s.duration()).sum()
    }
}

fn snap(t: f32) -> f32 {
    (t * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: f32, end: f32, channels: Channels) -> TimeSlot {
        TimeSlot {
            start,
            end,
            channels,
            play: Play::new(CardInstanceId::new(0, 0), Stakes::Guarded),
        }
    }

    #[test]
    fn can_insert_rejects_overlapping_conflicting_channels() {
        let mut t = Timeline::new();
        t.insert(slot(0.0, 0.3, Channels::WEAPON)).unwrap();
        assert!(!t.can_insert(0.1, 0.2, Channels::WEAPON));
        assert!(t.can_insert(0.1, 0.2, Channels::FOOTWORK));
    }

    #[test]
    fn can_insert_allows_non_overlapping_same_channel() {
        let mut t = Timeline::new();
        t.insert(slot(0.0, 0.3, Channels::WEAPON)).unwrap();
        assert!(t.can_insert(0.3, 0.2, Channels::WEAPON));
    }

    #[test]
    fn next_available_start_finds_gap() {
        let mut t = Timeline::new();
        t.insert(slot(0.0, 0.3, Channels::WEAPON)).unwrap();
        let next = t.next_available_start(0.0, 0.2, Channels::WEAPON);
        assert_eq!(next, Some(0.3));
    }

    #[test]
    fn remove_leaves_gap_does_not_repack() {
        let mut t = Timeline::new();
        t.insert(slot(0.0, 0.3, Channels::WEAPON)).unwrap();
        t.insert(slot(0.5, 0.7, Channels::FOOTWORK)).unwrap();
        t.remove(0);
        assert_eq!(t.slots().len(), 1);
        assert_eq!(t.slots()[0].start, 0.5);
    }

    #[test]
    fn reserved_time_sums_durations() {
        let mut t = Timeline::new();
        t.insert(slot(0.0, 0.3, Channels::WEAPON)).unwrap();
        t.insert(slot(0.3, 0.5, Channels::FOOTWORK)).unwrap();
        assert!((t.reserved_time() - 0.5).abs() < 1e-6);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_channels() -> impl Strategy<Value = Channels> {
        (0u8..16).prop_map(Channels::from_bits_truncate)
    }

    fn arb_slot() -> impl Strategy<Value = (f32, f32, Channels)> {
        (0u32..10, 1u32..6, arb_channels()).prop_map(|(start_tenths, len_tenths, channels)| {
            let start = start_tenths as f32 / 10.0;
            let end = (start_tenths + len_tenths) as f32 / 10.0;
            (start, end, channels)
        })
    }

    proptest! {
        /// Whatever sequence of slots is accepted by `can_insert`, no two
        /// accepted slots that overlap in time ever share a conflicting
        /// channel — `can_insert` is the sole gate, so this is really a
        /// check that it keeps its promise under arbitrary insertion order.
        #[test]
        fn accepted_slots_never_share_conflicting_channels_while_overlapping(
            candidates in proptest::collection::vec(arb_slot(), 1..8)
        ) {
            let mut timeline = Timeline::new();
            for (start, end, channels) in candidates {
                if end <= start {
                    continue;
                }
                if timeline.can_insert(start, end - start, channels) {
                    let _ = timeline.insert(TimeSlot {
                        start,
                        end,
                        channels,
                        play: Play::new(CardInstanceId::new(0, 0), Stakes::Guarded),
                    });
                }
            }
            let slots = timeline.slots();
            for i in 0..slots.len() {
                for j in (i + 1)..slots.len() {
                    let (a, b) = (&slots[i], &slots[j]);
                    let overlaps = a.start < b.end && b.start < a.end;
                    prop_assert!(!(overlaps && a.channels.conflicts(b.channels)));
                }
            }
        }
    }
}
