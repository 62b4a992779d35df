//! Snapshot persistence: serialize and atomically replace the output file.
//!
//! Every flush writes the whole snapshot to `<path>.tmp` (the full file
//! name plus `.tmp`), syncs it, and renames it over `<path>`. Readers see
//! either the previous file or the new one, never a partial write, and the
//! file never grows by appending. A failed write removes its temp file.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use killboard_store::Snapshot;

/// Errors that can occur while persisting a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The snapshot could not be encoded.
    #[error("snapshot serialization failed: {source}")]
    Serialization {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The file system rejected the write or the rename.
    #[error("snapshot write to {path} failed: {source}")]
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Encode a snapshot as pretty-printed JSON.
pub fn serialize_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, PersistError> {
    let mut bytes = serde_json::to_vec_pretty(snapshot)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes snapshots to one output file.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    /// Create a writer for the given output path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and write a snapshot.
    pub fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let bytes = serialize_snapshot(snapshot)?;
        self.persist(&bytes)?;
        debug!(
            path = %self.path.display(),
            actors = snapshot.actors.len(),
            groups = snapshot.groups.len(),
            bytes = bytes.len(),
            "Snapshot written"
        );
        Ok(())
    }

    /// Replace the output file with `bytes`.
    pub fn persist(&self, bytes: &[u8]) -> Result<(), PersistError> {
        let io_err = |source| PersistError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let temp_path = temp_path_for(&self.path);
        let written =
            write_synced(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(source) = written {
            discard(&temp_path);
            return Err(io_err(source));
        }
        Ok(())
    }
}

/// `<path>.tmp`, keeping the whole file name so it never equals `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(OsString::new, ToOwned::to_owned);
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

/// Best-effort removal of a temp file left by a failed write.
fn discard(path: &Path) {
    let Err(e) = fs::remove_file(path) else {
        return;
    };
    if e.kind() != io::ErrorKind::NotFound {
        debug!(path = %path.display(), error = %e, "Failed to remove temp file");
    }
}
