//! Identity resolution: raw simulation handle to [`ActorDescriptor`].
//!
//! Resolution never fails once the entity exists. Every query that comes
//! back empty degrades the descriptor to a locally derived default.

use killboard_types::{
    ActorDescriptor, Affiliation, Domain, GroupAffiliation, RawActorId, RawWeaponId, StableId,
    UNAVAILABLE_WEAPON, WeaponDescriptor,
};
use tracing::debug;

use crate::database::ActorDatabase;
use crate::lookup::{ExternalIdentity, IdentityLookup, IdentityProbe, default_chain};
use crate::world::{EntityInfo, EntitySource};

/// Resolves raw handles into descriptors, consulting the actor database
/// for human-controlled entities.
pub struct IdentityResolver<D> {
    database: D,
    chain: Vec<Box<dyn IdentityLookup>>,
}

impl<D: ActorDatabase> IdentityResolver<D> {
    /// Create a resolver with the standard lookup chain.
    pub fn new(database: D) -> Self {
        Self::with_chain(database, default_chain())
    }

    /// Create a resolver with a custom lookup chain, tried in order.
    pub fn with_chain(database: D, chain: Vec<Box<dyn IdentityLookup>>) -> Self {
        Self { database, chain }
    }

    /// Resolve an actor handle.
    ///
    /// Returns `None` only when the handle no longer refers to a live
    /// entity. Callers must treat that as "nothing attributable".
    pub fn resolve(&self, world: &dyn EntitySource, actor: RawActorId) -> Option<ActorDescriptor> {
        let Some(entity) = world.inspect(actor) else {
            debug!(actor = %actor, "Actor no longer exists");
            return None;
        };

        let (mut display_name, mut name_is_placeholder) = local_display_name(actor, &entity);
        let is_controlled = entity
            .player_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());

        let mut stable_id: Option<StableId> = None;
        if is_controlled {
            let found = {
                let probe = IdentityProbe {
                    raw_id: actor,
                    display_name: &display_name,
                    designer_name: entity.designer_name.as_deref(),
                };
                self.lookup_identity(&probe)
            };

            match found {
                Some(ExternalIdentity { stable_id: id, name }) => {
                    if let Some(authoritative) = name.filter(|n| *n != display_name) {
                        debug!(
                            actor = %actor,
                            local = %display_name,
                            authoritative = %authoritative,
                            "Actor database name overrides local name"
                        );
                        display_name = authoritative;
                        name_is_placeholder = false;
                    }
                    stable_id = Some(id);
                }
                None => {
                    debug!(actor = %actor, name = %display_name, "No stable identity for controlled actor");
                }
            }
        }

        let domain = entity
            .group
            .as_ref()
            .and_then(|g| g.category)
            .map_or(Domain::Unknown, Domain::from_group_category);

        let group = entity
            .group
            .as_ref()
            .and_then(|g| g.name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| GroupAffiliation::placeholder(actor), GroupAffiliation::named);

        Some(ActorDescriptor {
            raw_id: actor,
            display_name,
            name_is_placeholder,
            stable_id,
            domain,
            affiliation: Affiliation::from_coalition(entity.coalition),
            is_controlled,
            group,
        })
    }

    /// Resolve the weapon of an event.
    ///
    /// Never fails: a missing handle or a failed lookup yields the
    /// "unavailable" stand-in.
    pub fn resolve_weapon(
        &self,
        world: &dyn EntitySource,
        weapon: Option<RawWeaponId>,
    ) -> WeaponDescriptor {
        let Some(info) = weapon.and_then(|w| world.weapon(w)) else {
            return WeaponDescriptor::unavailable();
        };

        let type_name = info.type_name.filter(|t| !t.trim().is_empty());
        let name = info
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| type_name.clone())
            .unwrap_or_else(|| UNAVAILABLE_WEAPON.to_owned());

        match type_name {
            Some(type_name) => WeaponDescriptor {
                name,
                type_name,
                is_placeholder: false,
            },
            None => WeaponDescriptor {
                name,
                type_name: UNAVAILABLE_WEAPON.to_owned(),
                is_placeholder: true,
            },
        }
    }

    /// Run the lookup chain, stopping at the first usable identity.
    fn lookup_identity(&self, probe: &IdentityProbe<'_>) -> Option<ExternalIdentity> {
        self.chain.iter().find_map(|strategy| {
            let found = strategy.lookup(&self.database, probe);
            if found.is_some() {
                debug!(actor = %probe.raw_id, strategy = strategy.name(), "Stable identity found");
            }
            found
        })
    }
}

impl<D> core::fmt::Debug for IdentityResolver<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let strategies: Vec<&str> = self.chain.iter().map(|s| s.name()).collect();
        f.debug_struct("IdentityResolver")
            .field("chain", &strategies)
            .finish_non_exhaustive()
    }
}

/// Pick the best local name: player, designer, type, then a placeholder.
///
/// A type name is shared by every unit of that type, so it is reported as
/// a placeholder: it labels the record but never keys it.
fn local_display_name(actor: RawActorId, entity: &EntityInfo) -> (String, bool) {
    let own = [entity.player_name.as_deref(), entity.designer_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty());
    if let Some(name) = own {
        return (name.to_owned(), false);
    }
    entity
        .type_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(
            || (ActorDescriptor::placeholder_name(actor), true),
            |name| (name.to_owned(), true),
        )
}
