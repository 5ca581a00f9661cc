//! JSON store file for the admin CLI.
//!
//! The CLI embeds the in-memory platform and config backends; this module
//! persists their snapshots to a single human-inspectable JSON file between
//! invocations. A missing file is an empty store.

use std::{fs, io, path::PathBuf};

use channel3_bridge::{
    config::ConfigSnapshot,
    platform::PlatformSnapshot,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while loading or saving the store file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("store file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The file exists but is not a valid store snapshot.
    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Combined snapshot of everything the CLI persists.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Platform tables (integrations, consumers, tokens).
    #[serde(default)]
    pub platform: PlatformSnapshot,
    /// Configuration entries (connection state, endpoint override).
    #[serde(default)]
    pub config: ConfigSnapshot,
}

/// A store snapshot bound to a path on disk.
#[derive(Debug, Clone)]
pub struct StoreFile {
    path: PathBuf,
}

impl StoreFile {
    /// Binds a store to a file path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the snapshot; a missing file yields the empty store.
    pub fn load(&self) -> Result<StoreSnapshot, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StoreSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the snapshot back, pretty-printed for inspection.
    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
