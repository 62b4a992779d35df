//! Actor identity resolution and aggregation key assignment for Killboard.
//!
//! Events name their participants by transient simulation handles. This
//! crate turns a handle into an [`ActorDescriptor`] and the descriptor into
//! the [`AggregationKey`] that indexes the actor's counters for the rest of
//! the session.
//!
//! # Collaborators
//!
//! Two external systems are consulted and both sit behind traits:
//!
//! - [`EntitySource`] -- the simulation's live-object view.
//! - [`ActorDatabase`] -- the external table of human players.
//!
//! In-memory implementations ([`InMemoryWorld`], [`InMemoryActorDatabase`])
//! back the engine's feed adapter and the tests.
//!
//! [`ActorDescriptor`]: killboard_types::ActorDescriptor
//! [`AggregationKey`]: killboard_types::AggregationKey

pub mod database;
pub mod keys;
pub mod lookup;
pub mod resolver;
pub mod world;

pub use database::{ActorDatabase, DatabaseError, ExternalActorRow, InMemoryActorDatabase};
pub use keys::{AssignedKey, KeyAssigner, KeyOrigin, preferred_key};
pub use lookup::{
    ById, ByDesignerName, ExternalIdentity, IdentityLookup, IdentityProbe, TableScan,
    default_chain,
};
pub use resolver::IdentityResolver;
pub use world::{EntityInfo, EntitySource, GroupInfo, InMemoryWorld, WeaponInfo};
