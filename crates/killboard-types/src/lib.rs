//! Shared type definitions for the Killboard combat statistics aggregator.
//!
//! This crate is the single source of truth for the types passed between
//! the identity layer, the counter store, and the dispatcher.
//!
//! # Modules
//!
//! - [`ids`] -- Raw simulation handles and string key wrappers
//! - [`enums`] -- Domain, affiliation, engagement category, counter tags
//! - [`structs`] -- Actor, group, and weapon descriptors
//! - [`events`] -- The closed set of combat events

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ActorCounter, Affiliation, Domain, GroupCategory, InteractionCategory, WeaponStat};
pub use events::{CombatEvent, Engagement, EventEnvelope};
pub use ids::{AggregationKey, GroupKey, RawActorId, RawWeaponId, StableId, UNRESOLVED_STABLE_ID};
pub use structs::{ActorDescriptor, GroupAffiliation, UNAVAILABLE_WEAPON, WeaponDescriptor};
