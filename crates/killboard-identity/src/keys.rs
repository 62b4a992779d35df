//! Aggregation key assignment.
//!
//! Precedence: stable identity, then a real display name, then a
//! synthesized fallback. Fallback keys carry a time and random token so
//! they cannot collide with a key derived later from a real identity.
//! A fallback is minted once per simulation handle and reused for the rest
//! of the session, so repeated events from the same unresolved entity land
//! in one record.

use std::collections::BTreeMap;

use chrono::Utc;

use killboard_types::{ActorDescriptor, AggregationKey, RawActorId};

/// Separates the descriptive prefix of a fallback key from its token.
const FALLBACK_SEPARATOR: char = '#';

/// Prefix used when a descriptor has no fragment worth keeping.
const FALLBACK_PREFIX: &str = "unidentified";

/// Which rule produced a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyOrigin {
    /// The actor's external identity.
    StableId,
    /// The actor's display name.
    DisplayName,
    /// A synthesized key; the record wants a later identity upgrade.
    Fallback,
}

/// A key together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedKey {
    /// The aggregation key.
    pub key: AggregationKey,
    /// How it was derived.
    pub origin: KeyOrigin,
}

/// Derive the key from identity alone, without synthesizing a fallback.
///
/// Returns `None` when neither a stable identity nor a real display name is
/// available.
pub fn preferred_key(descriptor: &ActorDescriptor) -> Option<AssignedKey> {
    if let Some(stable_id) = &descriptor.stable_id {
        return Some(AssignedKey {
            key: AggregationKey::new(stable_id.as_str()),
            origin: KeyOrigin::StableId,
        });
    }
    if descriptor.has_real_name() {
        return Some(AssignedKey {
            key: AggregationKey::new(descriptor.display_name.trim()),
            origin: KeyOrigin::DisplayName,
        });
    }
    None
}

/// Assigns aggregation keys for one session.
#[derive(Debug, Clone, Default)]
pub struct KeyAssigner {
    /// Fallback keys already minted, by simulation handle.
    fallbacks: BTreeMap<RawActorId, AggregationKey>,
}

impl KeyAssigner {
    /// Create an assigner with no minted fallbacks.
    pub const fn new() -> Self {
        Self {
            fallbacks: BTreeMap::new(),
        }
    }

    /// Assign the aggregation key for a descriptor. Never fails.
    ///
    /// A handle that already received a fallback keeps it, even if this
    /// descriptor now carries a better identity. The counter store upgrades
    /// the record's identity fields instead of moving its history.
    pub fn assign(&mut self, descriptor: &ActorDescriptor) -> AssignedKey {
        if let Some(pinned) = self.fallbacks.get(&descriptor.raw_id) {
            return AssignedKey {
                key: pinned.clone(),
                origin: KeyOrigin::Fallback,
            };
        }

        if let Some(assigned) = preferred_key(descriptor) {
            return assigned;
        }

        let key = synthesize_fallback(descriptor);
        tracing::debug!(
            raw_id = %descriptor.raw_id,
            key = %key,
            "No usable identity, minted fallback key"
        );
        self.fallbacks.insert(descriptor.raw_id, key.clone());
        AssignedKey {
            key,
            origin: KeyOrigin::Fallback,
        }
    }

    /// Forget the fallback pinned to a handle.
    ///
    /// Call when the entity leaves the world: the simulation may hand the
    /// same handle to a different entity later, which must not inherit the
    /// old key. The record already stored under that key is left alone.
    pub fn release(&mut self, raw_id: RawActorId) -> Option<AggregationKey> {
        self.fallbacks.remove(&raw_id)
    }

    /// The fallback key minted for a handle, if any.
    pub fn fallback_for(&self, raw_id: RawActorId) -> Option<&AggregationKey> {
        self.fallbacks.get(&raw_id)
    }

    /// Number of fallback keys minted so far.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.len()
    }
}

/// Build a collision-safe key from whatever fragments the descriptor has.
fn synthesize_fallback(descriptor: &ActorDescriptor) -> AggregationKey {
    let mut fragments: Vec<&str> = Vec::new();
    if let Some(stable_id) = &descriptor.stable_id {
        fragments.push(stable_id.as_str());
    }
    let name = descriptor.display_name.trim();
    if !name.is_empty() {
        fragments.push(name);
    }
    let prefix = if fragments.is_empty() {
        FALLBACK_PREFIX.to_owned()
    } else {
        fragments.join("|")
    };

    let millis = Utc::now().timestamp_millis();
    let nonce: u32 = rand::random();
    AggregationKey::new(format!("{prefix}{FALLBACK_SEPARATOR}{millis:x}-{nonce:08x}"))
}
