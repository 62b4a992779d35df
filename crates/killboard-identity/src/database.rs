//! The external actor database.
//!
//! Maps simulation entities controlled by human players to the persistent
//! identity the player is known by. The database exposes three access paths
//! that differ in cost and coverage: an id-indexed table, a table indexed by
//! the designer-assigned unit name, and the full actor table for scanning.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use killboard_types::RawActorId;

/// Errors that can occur when loading an actor table from disk.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The file could not be read.
    #[error("failed to read actor table: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The file is not a JSON array of actor rows.
    #[error("failed to parse actor table: {source}")]
    Parse {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// One row of the external actor table.
///
/// `stable_id` is stored exactly as the database has it, which may be empty
/// or the unresolved sentinel. Lookup strategies validate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalActorRow {
    /// The simulation handle the row was last associated with.
    #[serde(default)]
    pub raw_id: Option<RawActorId>,
    /// The persistent identity as recorded.
    #[serde(default)]
    pub stable_id: String,
    /// The player's authoritative display name.
    #[serde(default)]
    pub name: Option<String>,
    /// The designer-assigned name of the unit the player occupies.
    #[serde(default)]
    pub designer_name: Option<String>,
}

/// Query interface of the external actor database.
pub trait ActorDatabase {
    /// Reverse lookup by simulation handle.
    fn by_id(&self, raw_id: RawActorId) -> Option<ExternalActorRow>;

    /// Lookup by the designer-assigned unit name.
    fn by_name(&self, designer_name: &str) -> Option<ExternalActorRow>;

    /// The full actor table, in table order.
    fn scan(&self) -> Vec<ExternalActorRow>;
}

/// An [`ActorDatabase`] held in memory.
///
/// The three tables are independent, the way they are in the live
/// database: a player may be present in the full table without being
/// indexed by id or by name yet.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActorDatabase {
    by_id: BTreeMap<RawActorId, ExternalActorRow>,
    by_name: BTreeMap<String, ExternalActorRow>,
    actors: Vec<ExternalActorRow>,
}

impl InMemoryActorDatabase {
    /// Create an empty database. Every lookup misses.
    pub const fn new() -> Self {
        Self {
            by_id: BTreeMap::new(),
            by_name: BTreeMap::new(),
            actors: Vec::new(),
        }
    }

    /// Build a database with every row present in all three tables.
    pub fn from_rows(rows: Vec<ExternalActorRow>) -> Self {
        let mut db = Self::new();
        for row in &rows {
            if let Some(raw_id) = row.raw_id {
                db.by_id.insert(raw_id, row.clone());
            }
            if let Some(designer_name) = &row.designer_name {
                db.by_name.insert(designer_name.clone(), row.clone());
            }
        }
        db.actors = rows;
        db
    }

    /// Load a JSON array of [`ExternalActorRow`] values.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DatabaseError> {
        let contents = std::fs::read_to_string(path)?;
        let rows: Vec<ExternalActorRow> = serde_json::from_str(&contents)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "Actor table loaded");
        Ok(Self::from_rows(rows))
    }

    /// Index a row in the id table only.
    pub fn insert_by_id(&mut self, raw_id: RawActorId, row: ExternalActorRow) {
        self.by_id.insert(raw_id, row);
    }

    /// Index a row in the name table only.
    pub fn insert_by_name(&mut self, designer_name: impl Into<String>, row: ExternalActorRow) {
        self.by_name.insert(designer_name.into(), row);
    }

    /// Append a row to the full table only.
    pub fn push_row(&mut self, row: ExternalActorRow) {
        self.actors.push(row);
    }
}

impl ActorDatabase for InMemoryActorDatabase {
    fn by_id(&self, raw_id: RawActorId) -> Option<ExternalActorRow> {
        self.by_id.get(&raw_id).cloned()
    }

    fn by_name(&self, designer_name: &str) -> Option<ExternalActorRow> {
        self.by_name.get(designer_name).cloned()
    }

    fn scan(&self) -> Vec<ExternalActorRow> {
        self.actors.clone()
    }
}
