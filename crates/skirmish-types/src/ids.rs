//! Branded/newtype ID types for type safety.
//!
//! Template ids are stable interned strings — `skirmish-data` only requires
//! that a string resolve in its table at `validate_tables()` time, not that
//! it be numeric or ordinal. Live, mutable entities (agents, card instances,
//! wounds) use `EntityId` instead — see `crate::registry`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Box<str>);

        impl $name {
            pub fn new(s: impl Into<Box<str>>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.into())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s.into_boxed_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Card template identifier.
    CardId
);

define_id!(
    /// Embedded technique identifier (weapon moves, footwork, reactions).
    TechniqueId
);

define_id!(
    /// Weapon template identifier.
    WeaponId
);

define_id!(
    /// Armour piece template identifier.
    ArmourId
);

define_id!(
    /// Body plan template identifier (humanoid, quadruped, ...).
    BodyPlanId
);
