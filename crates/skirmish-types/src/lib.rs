//! Core types for the skirmish combat engine — zero external deps beyond
//! serde, arrayvec and bitflags at the wire/storage boundary.
//!
//! This crate defines every type shared across the engine: ids, enums, the
//! rule/predicate/effect grammar, body/armour/engagement/timeline/zone
//! shapes, commands, events, and the seeded RNG. It holds no mutating
//! logic — that lives in `skirmish-engine`.

pub mod body;
pub mod command;
pub mod engagement;
pub mod enums;
pub mod event;
pub mod ids;
pub mod agent;
pub mod registry;
pub mod rng;
pub mod rule;
pub mod snapshot;
pub mod template;
pub mod timeline;
pub mod zone;

pub use agent::{ActiveCondition, Agent, CombatState, Expiration, ResourcePool, Resources};
pub use body::{Body, LayerState, Part, Wound};
pub use command::{Command, CommandError};
pub use engagement::{canonical_pair, Engagement, EngagementMap};
pub use enums::*;
pub use event::{CombatOutcome, Event, TechniqueOutcome};
pub use ids::*;
pub use registry::{AgentId, AgentMarker, CardInstanceId, CardInstanceMarker, EntityId};
pub use rng::{RngState, RngStreams};
pub use rule::{Effect, EventTag, Expression, Predicate, Rule, RuleContext, RuleError, TargetQuery, Trigger};
pub use snapshot::{CardStatus, CombatSnapshot, EnemySummary, PlaySummary, ResourceSnapshot};
pub use template::{Cost, Rarity, ReachBand, Technique, Template};
pub use timeline::{Play, TimeSlot, Timeline, MAX_MODIFIER_STACK, MAX_TIMELINE_SLOTS};
pub use zone::{CardInstance, EnvironmentZone, ZoneSet};
