//! Reader for bincode family snapshots
//!
//! A snapshot is a [MemoryDatabase] serialised with bincode and stored as
//! `<family name>.msnap` in the family directory, i.e. next to the `.mili`
//! sidecar. Domain files of a multi-domain family are separate snapshots named
//! exactly as the reader probes for them (`root000.msnap`, `root0001.msnap`...).

// standard library
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// internal modules
use crate::error::{LibResult, LibraryError};
use crate::library::{MemoryDatabase, MiliDatabase, MiliLibrary};
use crate::utils::f;

// external crates
use anyhow::{Context, Result};
use log::debug;

/// File extension of family snapshots
pub const SNAPSHOT_EXTENSION: &str = "msnap";

/// A library that opens families from snapshot files
#[derive(Debug, Default)]
pub struct SnapshotLibrary;

impl SnapshotLibrary {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }
}

impl MiliLibrary for SnapshotLibrary {
    fn open(&self, path: &Path, name: &str) -> LibResult<Box<dyn MiliDatabase>> {
        let file_path = path.join(f!("{name}.{SNAPSHOT_EXTENSION}"));
        let file = File::open(&file_path)
            .map_err(|e| LibraryError::new(f!("Could not open {}: {e}", file_path.display())))?;

        let database: MemoryDatabase = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| LibraryError::new(f!("Bad snapshot {}: {e}", file_path.display())))?;

        debug!("Loaded snapshot {}", file_path.display());
        Ok(Box::new(database))
    }
}

impl MemoryDatabase {
    /// Write the family as a snapshot that [SnapshotLibrary] can open
    pub fn save_snapshot(&self, dir: &Path, name: &str) -> Result<()> {
        let file_path = dir.join(f!("{name}.{SNAPSHOT_EXTENSION}"));
        let file = File::create(&file_path)
            .with_context(|| f!("Could not create {}", file_path.display()))?;
        bincode::serialize_into(BufWriter::new(file), self)
            .with_context(|| f!("Could not serialise family {name}"))?;
        Ok(())
    }
}
