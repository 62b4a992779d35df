//! The live-object view of the simulation.
//!
//! The aggregator never owns simulated entities. It asks an
//! [`EntitySource`] what a raw handle currently refers to, and gets nothing
//! back once the object is gone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use killboard_types::{GroupCategory, RawActorId, RawWeaponId};

/// Intrinsic information the simulation reports for a live entity.
///
/// Every field except the id may be missing; a missing field means the
/// corresponding query failed or the entity has no such property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// The entity's simulation handle.
    pub id: RawActorId,
    /// Object type, e.g. `F-16C_50`.
    #[serde(default)]
    pub type_name: Option<String>,
    /// Name assigned by the mission designer.
    #[serde(default)]
    pub designer_name: Option<String>,
    /// Name of the human player in control, if any.
    #[serde(default)]
    pub player_name: Option<String>,
    /// Numeric coalition code.
    #[serde(default)]
    pub coalition: Option<i64>,
    /// The entity's unit group.
    #[serde(default)]
    pub group: Option<GroupInfo>,
}

/// A unit group as reported by the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Group name, absent if the group could not be queried.
    #[serde(default)]
    pub name: Option<String>,
    /// Group category, absent if unreported.
    #[serde(default)]
    pub category: Option<GroupCategory>,
}

/// A weapon object as reported by the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponInfo {
    /// The weapon's simulation handle.
    pub id: RawWeaponId,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Weapon type, e.g. `AIM_120C`.
    #[serde(default)]
    pub type_name: Option<String>,
}

/// Answers questions about live simulation objects.
///
/// Implementations return `None` for handles that no longer refer to an
/// existing object.
pub trait EntitySource {
    /// Inspect a live actor.
    fn inspect(&self, actor: RawActorId) -> Option<EntityInfo>;

    /// Inspect a weapon object.
    fn weapon(&self, weapon: RawWeaponId) -> Option<WeaponInfo>;
}

/// An [`EntitySource`] backed by maps, kept current by spawn/despawn calls.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorld {
    entities: BTreeMap<RawActorId, EntityInfo>,
    weapons: BTreeMap<RawWeaponId, WeaponInfo>,
}

impl InMemoryWorld {
    /// Create an empty world.
    pub const fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            weapons: BTreeMap::new(),
        }
    }

    /// Add or replace a live entity.
    pub fn spawn(&mut self, entity: EntityInfo) {
        self.entities.insert(entity.id, entity);
    }

    /// Remove an entity. Later lookups for its handle return `None`.
    pub fn despawn(&mut self, actor: RawActorId) -> Option<EntityInfo> {
        self.entities.remove(&actor)
    }

    /// Add or replace a weapon object.
    pub fn register_weapon(&mut self, weapon: WeaponInfo) {
        self.weapons.insert(weapon.id, weapon);
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entities are alive.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntitySource for InMemoryWorld {
    fn inspect(&self, actor: RawActorId) -> Option<EntityInfo> {
        self.entities.get(&actor).cloned()
    }

    fn weapon(&self, weapon: RawWeaponId) -> Option<WeaponInfo> {
        self.weapons.get(&weapon).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: u64) -> EntityInfo {
        EntityInfo {
            id: RawActorId(id),
            type_name: Some(String::from("T-72B")),
            designer_name: None,
            player_name: None,
            coalition: Some(1),
            group: None,
        }
    }

    #[test]
    fn despawned_entities_are_gone() {
        let mut world = InMemoryWorld::new();
        world.spawn(entity(1));
        assert!(world.inspect(RawActorId(1)).is_some());
        assert!(world.despawn(RawActorId(1)).is_some());
        assert!(world.inspect(RawActorId(1)).is_none());
        assert!(world.is_empty());
    }

    #[test]
    fn entity_info_tolerates_missing_fields() {
        let parsed: Result<EntityInfo, _> = serde_json::from_str(r#"{"id": 4}"#);
        assert!(parsed.is_ok());
        assert_eq!(parsed.ok().and_then(|e| e.group), None);
    }
}
