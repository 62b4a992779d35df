//! Point-in-time copies of the counter store.
//!
//! A [`Snapshot`] is fully materialized: it owns every value it holds and
//! shares nothing with the live store, so it can be serialized and written
//! while aggregation continues.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use killboard_types::{AggregationKey, GroupKey};

use crate::records::{ActorCounterRecord, CounterSet, GroupCounterRecord, WeaponCounters};
use crate::store::CounterStore;

/// Rendered in place of an identity field that has no value.
pub const UNKNOWN_FIELD: &str = "unknown";

/// Every counter in the store at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// The aggregation session the counters belong to.
    pub session_id: Uuid,
    /// When the copy was taken.
    pub captured_at: DateTime<Utc>,
    /// Events processed by the session up to the capture.
    pub events_processed: u64,
    /// One entry per actor key, ordered by key.
    pub actors: Vec<ActorSnapshot>,
    /// One entry per group key, ordered by key.
    pub groups: Vec<GroupSnapshot>,
}

/// One actor record in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorSnapshot {
    /// Aggregation key.
    pub key: AggregationKey,
    /// Best-known display name.
    pub display_name: String,
    /// Best-known external identity, or [`UNKNOWN_FIELD`].
    pub stable_id: String,
    /// The nine scalar counters.
    #[serde(flatten)]
    pub counters: CounterSet,
    /// One entry per weapon type, ordered by type.
    pub weapons: Vec<WeaponSnapshot>,
}

/// One weapon bucket of an actor snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponSnapshot {
    /// Weapon type.
    pub weapon_type: String,
    /// Shots, hits, and kills.
    #[serde(flatten)]
    pub counters: WeaponCounters,
}

/// One group record in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSnapshot {
    /// Normalized group key.
    pub key: GroupKey,
    /// The nine scalar counters.
    #[serde(flatten)]
    pub counters: CounterSet,
}

impl Snapshot {
    /// Copy every record of the store.
    pub fn capture(store: &CounterStore, events_processed: u64) -> Self {
        Self {
            session_id: store.session_id(),
            captured_at: Utc::now(),
            events_processed,
            actors: store.actors().map(ActorSnapshot::from_record).collect(),
            groups: store.groups().map(GroupSnapshot::from_record).collect(),
        }
    }
}

impl ActorSnapshot {
    fn from_record(record: &ActorCounterRecord) -> Self {
        let display_name = if record.display_name().trim().is_empty() {
            UNKNOWN_FIELD.to_owned()
        } else {
            record.display_name().to_owned()
        };
        Self {
            key: record.key().clone(),
            display_name,
            stable_id: record
                .stable_id()
                .map_or_else(|| UNKNOWN_FIELD.to_owned(), ToString::to_string),
            counters: *record.counters(),
            weapons: record
                .weapons()
                .iter()
                .map(|(weapon_type, counters)| WeaponSnapshot {
                    weapon_type: weapon_type.clone(),
                    counters: *counters,
                })
                .collect(),
        }
    }
}

impl GroupSnapshot {
    fn from_record(record: &GroupCounterRecord) -> Self {
        Self {
            key: record.key().clone(),
            counters: *record.counters(),
        }
    }
}
