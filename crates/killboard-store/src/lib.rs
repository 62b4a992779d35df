//! Per-actor and per-group counter store for Killboard.
//!
//! The store is a single-writer, in-memory aggregate. The dispatcher calls
//! the ensure and increment operations; the persistence layer reads a
//! [`Snapshot`] on a timer.
//!
//! # Modules
//!
//! - [`store`] -- The [`CounterStore`]: ensure, increment, and read operations.
//! - [`records`] -- Actor and group records and their counter sets.
//! - [`snapshot`] -- Owned point-in-time copies ready for serialization.
//!
//! # Counters
//!
//! | Counter | Actor | Group |
//! |---------|-------|-------|
//! | same-domain shots / hits / kills | yes | yes |
//! | cross-domain shots / hits / kills | yes | yes |
//! | deaths | yes | yes |
//! | friendly-fire hits / kills | yes | yes |
//! | per-weapon shots / hits / kills | yes | no |
//!
//! # Usage
//!
//! ```
//! use killboard_store::CounterStore;
//! use killboard_types::{
//!     ActorCounter, ActorDescriptor, Affiliation, Domain, GroupAffiliation, RawActorId,
//! };
//!
//! let mut store = CounterStore::new();
//! let pilot = ActorDescriptor {
//!     raw_id: RawActorId(1),
//!     display_name: "Enfield 1-1".to_owned(),
//!     name_is_placeholder: false,
//!     stable_id: None,
//!     domain: Domain::Air,
//!     affiliation: Affiliation::SideB,
//!     is_controlled: false,
//!     group: GroupAffiliation::named("Enfield"),
//! };
//!
//! let key = store.ensure_actor(&pilot);
//! store.increment_actor(&key, ActorCounter::Deaths);
//!
//! let snapshot = store.snapshot(1);
//! assert_eq!(snapshot.actors.len(), 1);
//! ```

pub mod records;
pub mod snapshot;
pub mod store;

// Re-export primary types at crate root.
pub use records::{ActorCounterRecord, CounterSet, GroupCounterRecord, WeaponCounters};
pub use snapshot::{ActorSnapshot, GroupSnapshot, Snapshot, UNKNOWN_FIELD, WeaponSnapshot};
pub use store::{
    CounterStore, UNGROUPED, UNKNOWN_WEAPON, normalize_group_key, normalize_weapon_type,
};
