//! Descriptors produced by the identity layer.
//!
//! Placeholder status is decided once, when a descriptor is built, and
//! carried as an explicit flag. Downstream code never inspects name strings
//! to guess whether they were synthesized.

use serde::{Deserialize, Serialize};

use crate::enums::{Affiliation, Domain};
use crate::ids::{RawActorId, StableId};

/// Display name given to the weapon of an event whose weapon could not be
/// looked up.
pub const UNAVAILABLE_WEAPON: &str = "unavailable";

// ---------------------------------------------------------------------------
// ActorDescriptor
// ---------------------------------------------------------------------------

/// The normalized view of one actor at the time of one event.
///
/// Built per event by the identity resolver and discarded afterwards. The
/// counter store copies whatever identity it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorDescriptor {
    /// Simulation handle the descriptor was resolved from.
    pub raw_id: RawActorId,
    /// Best available human-readable name.
    pub display_name: String,
    /// Whether `display_name` was synthesized from the raw id.
    pub name_is_placeholder: bool,
    /// External identity, present only for resolved controlled actors.
    pub stable_id: Option<StableId>,
    /// Operating medium.
    pub domain: Domain,
    /// Side the actor fights for.
    pub affiliation: Affiliation,
    /// Whether a human player controls the actor.
    pub is_controlled: bool,
    /// The unit group the actor belongs to.
    pub group: GroupAffiliation,
}

impl ActorDescriptor {
    /// The synthesized display name for an actor with no usable name.
    pub fn placeholder_name(raw_id: RawActorId) -> String {
        format!("actor-{raw_id}")
    }

    /// Whether the descriptor carries a usable display name.
    pub fn has_real_name(&self) -> bool {
        !self.name_is_placeholder && !self.display_name.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// GroupAffiliation
// ---------------------------------------------------------------------------

/// The unit group an actor belongs to, as reported at event time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAffiliation {
    /// Group name, or a per-entity placeholder.
    pub key: String,
    /// Whether `key` was synthesized because the group was missing.
    pub is_placeholder: bool,
}

impl GroupAffiliation {
    /// A group reported by the simulation.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            key: name.into(),
            is_placeholder: false,
        }
    }

    /// The per-entity placeholder used when the actor has no queryable group.
    pub fn placeholder(raw_id: RawActorId) -> Self {
        Self {
            key: format!("ungrouped-{raw_id}"),
            is_placeholder: true,
        }
    }
}

// ---------------------------------------------------------------------------
// WeaponDescriptor
// ---------------------------------------------------------------------------

/// Name and type of the weapon involved in an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDescriptor {
    /// Display name of the weapon object.
    pub name: String,
    /// Weapon type, used as the per-weapon bucket.
    pub type_name: String,
    /// Whether the descriptor is the "unavailable" stand-in.
    pub is_placeholder: bool,
}

impl WeaponDescriptor {
    /// The stand-in used when the weapon lookup fails.
    pub fn unavailable() -> Self {
        Self {
            name: UNAVAILABLE_WEAPON.to_owned(),
            type_name: UNAVAILABLE_WEAPON.to_owned(),
            is_placeholder: true,
        }
    }
}
