//! Static template tables for the skirmish combat engine — cards,
//! techniques, weapons, armour, body plans, and the condition-penalty
//! table. Everything here is immutable and loaded once at startup; the
//! only operation that mutates anything is `validate::validate_tables()`,
//! and that only builds a list of errors, never the tables themselves.

pub mod armour;
pub mod body_plans;
pub mod cards;
pub mod condition_penalties;
pub mod techniques;
pub mod validate;
pub mod weapons;

pub use validate::{validate_tables, TableError};
