//! The counter store: every counter the aggregator keeps, by key.
//!
//! The store is the only owner of counter records. It has a single writer
//! (the dispatcher) and is read whole when a snapshot is taken.
//!
//! # Design
//!
//! - **Idempotent ensure**: ensuring the same actor or group twice never
//!   resets anything.
//! - **Never fails**: increments for a key that was never ensured create
//!   the record on the spot.
//! - **Shared buckets**: placeholder group names collapse into
//!   [`UNGROUPED`], placeholder weapon types into [`UNKNOWN_WEAPON`].

use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use killboard_identity::{KeyAssigner, KeyOrigin};
use killboard_types::{
    ActorCounter, ActorDescriptor, AggregationKey, GroupAffiliation, GroupKey, RawActorId,
    WeaponDescriptor, WeaponStat,
};

use crate::records::{ActorCounterRecord, GroupCounterRecord};
use crate::snapshot::Snapshot;

/// The shared bucket for actors without a usable group.
pub const UNGROUPED: &str = "UNGROUPED";

/// The shared bucket for weapons without a usable type.
pub const UNKNOWN_WEAPON: &str = "UNKNOWN_WEAPON";

/// Group names the simulation reports when it has no real group.
///
/// The shared bucket's own name is listed too, so a group reported under
/// that name is counted in the bucket instead of posing as a second one.
const INVALID_GROUP_NAMES: &[&str] = &["unknown", "n/a", "none", "nil", UNGROUPED];

/// Normalize a reported group into the key it is counted under.
pub fn normalize_group_key(group: &GroupAffiliation) -> GroupKey {
    let name = group.key.trim();
    let invalid = group.is_placeholder
        || name.is_empty()
        || INVALID_GROUP_NAMES
            .iter()
            .any(|bad| name.eq_ignore_ascii_case(bad));
    if invalid {
        GroupKey::new(UNGROUPED)
    } else {
        GroupKey::new(name)
    }
}

/// Normalize a weapon into the bucket its counters live in.
pub fn normalize_weapon_type(weapon: &WeaponDescriptor) -> &str {
    let type_name = weapon.type_name.trim();
    if weapon.is_placeholder || type_name.is_empty() {
        UNKNOWN_WEAPON
    } else {
        type_name
    }
}

/// Per-actor and per-group counters for one aggregation session.
#[derive(Debug)]
pub struct CounterStore {
    session_id: Uuid,
    keys: KeyAssigner,
    actors: BTreeMap<AggregationKey, ActorCounterRecord>,
    groups: BTreeMap<GroupKey, GroupCounterRecord>,
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore {
    /// Create an empty store for a new session.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::now_v7(),
            keys: KeyAssigner::new(),
            actors: BTreeMap::new(),
            groups: BTreeMap::new(),
        }
    }

    /// The session this store aggregates.
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Make sure a record exists for the actor and return its key.
    ///
    /// A new key gets a zeroed record. An existing key keeps its counters;
    /// its identity fields are upgraded if the descriptor carries better
    /// information than what is stored.
    pub fn ensure_actor(&mut self, descriptor: &ActorDescriptor) -> AggregationKey {
        let assigned = self.keys.assign(descriptor);
        let is_fallback = assigned.origin == KeyOrigin::Fallback;

        if let Some(record) = self.actors.get_mut(&assigned.key) {
            if record.upgrade_identity(descriptor) {
                debug!(
                    key = %assigned.key,
                    display_name = record.display_name(),
                    "Actor identity upgraded"
                );
            }
        } else {
            debug!(key = %assigned.key, origin = ?assigned.origin, "New actor record");
            self.actors.insert(
                assigned.key.clone(),
                ActorCounterRecord::new(assigned.key.clone(), descriptor, is_fallback),
            );
        }

        assigned.key
    }

    /// Make sure a record exists for the group and return its normalized key.
    pub fn ensure_group(&mut self, group: &GroupAffiliation) -> GroupKey {
        let key = normalize_group_key(group);
        self.groups
            .entry(key.clone())
            .or_insert_with(|| GroupCounterRecord::new(key.clone()));
        key
    }

    /// Add one to an actor counter.
    pub fn increment_actor(&mut self, key: &AggregationKey, counter: ActorCounter) {
        self.actor_entry(key).increment(counter);
    }

    /// Add one to a group counter.
    pub fn increment_group(&mut self, key: &GroupKey, counter: ActorCounter) {
        self.groups
            .entry(key.clone())
            .or_insert_with(|| {
                debug!(group = %key, "Group incremented before ensure, creating");
                GroupCounterRecord::new(key.clone())
            })
            .increment(counter);
    }

    /// Add one to an actor's per-weapon counter.
    pub fn increment_weapon(
        &mut self,
        key: &AggregationKey,
        weapon: &WeaponDescriptor,
        stat: WeaponStat,
    ) {
        let bucket = normalize_weapon_type(weapon);
        if bucket == UNKNOWN_WEAPON {
            debug!(key = %key, stat = %stat, "Weapon type unavailable, using shared bucket");
        }
        self.actor_entry(key).increment_weapon(bucket, stat);
    }

    /// Forget the fallback key pinned to a simulation handle.
    ///
    /// The record stays under its key with its counters; the next entity
    /// given the same handle is keyed afresh.
    pub fn release_actor(&mut self, raw_id: RawActorId) {
        if let Some(key) = self.keys.release(raw_id) {
            debug!(actor = %raw_id, key = %key, "Fallback key released");
        }
    }

    /// Look up an actor record.
    pub fn actor(&self, key: &str) -> Option<&ActorCounterRecord> {
        self.actors.get(key)
    }

    /// Look up a group record.
    pub fn group(&self, key: &str) -> Option<&GroupCounterRecord> {
        self.groups.get(key)
    }

    /// All actor records, ordered by key.
    pub fn actors(&self) -> impl Iterator<Item = &ActorCounterRecord> {
        self.actors.values()
    }

    /// All group records, ordered by key.
    pub fn groups(&self) -> impl Iterator<Item = &GroupCounterRecord> {
        self.groups.values()
    }

    /// Number of actor records.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Number of group records.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Copy every record into an owned [`Snapshot`].
    ///
    /// Holding `&self` for the whole copy is the consistency boundary: no
    /// update can interleave with the read.
    pub fn snapshot(&self, events_processed: u64) -> Snapshot {
        Snapshot::capture(self, events_processed)
    }

    fn actor_entry(&mut self, key: &AggregationKey) -> &mut ActorCounterRecord {
        self.actors.entry(key.clone()).or_insert_with(|| {
            debug!(key = %key, "Actor incremented before ensure, creating");
            ActorCounterRecord::orphan(key.clone())
        })
    }
}
