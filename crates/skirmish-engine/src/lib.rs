//! The mutating combat core: entity registry, card registry/zones, rule
//! interpreter, engagement model, timeline/tick scheduler FSM, resolution
//! engine, physiology tick, condition iterator, event bus.
//!
//! Everything here mutates through a single exclusive `&mut World` per phase
//! transition; read-only paths (snapshot building, predicate evaluation) take
//! `&World`. No process-wide state — a `World` is scoped to one encounter.

pub mod card_registry;
pub mod commands;
pub mod condition_iterator;
pub mod engagement_ops;
pub mod events;
pub mod invariants;
pub mod physiology;
pub mod query;
pub mod registry;
pub mod resolution;
pub mod rule_interpreter;
pub mod scheduler;
pub mod world;

pub use commands::{apply_command, can_play_in_phase};
pub use events::EventBus;
pub use invariants::InvariantViolation;
pub use query::build_snapshot;
pub use registry::EntityRegistry;
pub use world::{Phase, TurnState, World};
