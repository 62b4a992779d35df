//! Ordered identity lookup strategies.
//!
//! Each strategy asks the [`ActorDatabase`] one way. The resolver runs them
//! in order and keeps the first one that produces a usable stable identity.

use killboard_types::{RawActorId, StableId};

use crate::database::{ActorDatabase, ExternalActorRow};

/// What the resolver knows about an entity when it starts looking it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityProbe<'a> {
    /// The entity's simulation handle.
    pub raw_id: RawActorId,
    /// The locally derived display name.
    pub display_name: &'a str,
    /// The designer-assigned unit name, if the entity reported one.
    pub designer_name: Option<&'a str>,
}

/// A successful identity lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// The validated persistent identity.
    pub stable_id: StableId,
    /// The database's display name for the player, if it has one.
    pub name: Option<String>,
}

impl ExternalIdentity {
    /// Convert a database row, dropping rows without a usable identity.
    pub fn from_row(row: ExternalActorRow) -> Option<Self> {
        let stable_id = StableId::parse(&row.stable_id)?;
        let name = row.name.filter(|n| !n.trim().is_empty());
        Some(Self { stable_id, name })
    }
}

/// One way of finding an entity in the actor database.
pub trait IdentityLookup: Send + Sync {
    /// Short strategy name, for logging.
    fn name(&self) -> &'static str;

    /// Try to find a usable identity for the probe.
    fn lookup(&self, database: &dyn ActorDatabase, probe: &IdentityProbe<'_>)
    -> Option<ExternalIdentity>;
}

/// Reverse lookup in the id-indexed table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ById;

impl IdentityLookup for ById {
    fn name(&self) -> &'static str {
        "by_id"
    }

    fn lookup(
        &self,
        database: &dyn ActorDatabase,
        probe: &IdentityProbe<'_>,
    ) -> Option<ExternalIdentity> {
        database
            .by_id(probe.raw_id)
            .and_then(ExternalIdentity::from_row)
    }
}

/// Lookup in the table indexed by designer-assigned unit name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByDesignerName;

impl IdentityLookup for ByDesignerName {
    fn name(&self) -> &'static str {
        "by_designer_name"
    }

    fn lookup(
        &self,
        database: &dyn ActorDatabase,
        probe: &IdentityProbe<'_>,
    ) -> Option<ExternalIdentity> {
        let designer_name = probe.designer_name.filter(|n| !n.is_empty())?;
        database
            .by_name(designer_name)
            .and_then(ExternalIdentity::from_row)
    }
}

/// Full scan of the actor table.
///
/// Matches on the simulation handle first, then on the current display
/// name, then on the designer-assigned name. A later pass only runs when the
/// earlier one found nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableScan;

impl IdentityLookup for TableScan {
    fn name(&self) -> &'static str {
        "table_scan"
    }

    fn lookup(
        &self,
        database: &dyn ActorDatabase,
        probe: &IdentityProbe<'_>,
    ) -> Option<ExternalIdentity> {
        let rows = database.scan();

        let by_id = |row: &ExternalActorRow| row.raw_id == Some(probe.raw_id);
        let by_display_name =
            |row: &ExternalActorRow| row.name.as_deref() == Some(probe.display_name);
        let by_designer_name = |row: &ExternalActorRow| {
            probe.designer_name.is_some() && row.designer_name.as_deref() == probe.designer_name
        };
        let passes: [&dyn Fn(&ExternalActorRow) -> bool; 3] =
            [&by_id, &by_display_name, &by_designer_name];

        passes.iter().find_map(|matches| {
            rows.iter()
                .filter(|&row| matches(row))
                .find_map(|row| ExternalIdentity::from_row(row.clone()))
        })
    }
}

/// The standard lookup order: id table, name table, full scan.
pub fn default_chain() -> Vec<Box<dyn IdentityLookup>> {
    vec![Box::new(ById), Box::new(ByDesignerName), Box::new(TableScan)]
}
