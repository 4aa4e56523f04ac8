//! JSON storage for definition tables and result snapshots.
//!
//! All files live under one root directory. Tables are what the ground
//! uplinks; the snapshot is the engine's restart-surviving state.

use std::path::{Path, PathBuf};

use thiserror::Error;

use sentinel::{ActionpointDefinition, EngineSnapshot, WatchpointDefinition};

/// Failure reading or writing a store file. Non-fatal to the engine;
/// callers degrade to cold initialization or skip the save.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed store for monitoring configuration and engine state.
#[derive(Debug, Clone)]
pub struct TableStore {
    root_path: PathBuf,
}

impl TableStore {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn watchpoint_path(&self) -> PathBuf {
        self.root_path.join("watchpoints.json")
    }

    fn actionpoint_path(&self) -> PathBuf {
        self.root_path.join("actionpoints.json")
    }

    fn snapshot_path(&self) -> PathBuf {
        self.root_path.join("results.json")
    }

    /// Get the stored watchpoint table.
    ///
    /// Returns None if no table has been saved.
    /// Returns Some(Err) if the file exists but cannot be loaded.
    pub fn get_watchpoints(&self) -> Option<Result<Vec<WatchpointDefinition>, StoreError>> {
        load_json(&self.watchpoint_path())
    }

    /// Save the watchpoint table, creating the root directory if needed.
    /// Returns the path the table was saved to.
    pub fn save_watchpoints(
        &self,
        definitions: &[WatchpointDefinition],
    ) -> Result<PathBuf, StoreError> {
        save_json(&self.root_path, self.watchpoint_path(), definitions)
    }

    /// Get the stored actionpoint table.
    pub fn get_actionpoints(&self) -> Option<Result<Vec<ActionpointDefinition>, StoreError>> {
        load_json(&self.actionpoint_path())
    }

    /// Save the actionpoint table.
    pub fn save_actionpoints(
        &self,
        definitions: &[ActionpointDefinition],
    ) -> Result<PathBuf, StoreError> {
        save_json(&self.root_path, self.actionpoint_path(), definitions)
    }

    /// Get the persisted engine snapshot.
    pub fn get_snapshot(&self) -> Option<Result<EngineSnapshot, StoreError>> {
        load_json(&self.snapshot_path())
    }

    /// Save an engine snapshot.
    pub fn save_snapshot(&self, snapshot: &EngineSnapshot) -> Result<PathBuf, StoreError> {
        save_json(&self.root_path, self.snapshot_path(), snapshot)
    }

    /// Delete the persisted snapshot.
    ///
    /// Returns Ok(true) if the file was deleted, Ok(false) if it didn't exist.
    pub fn delete_snapshot(&self) -> Result<bool, StoreError> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        Ok(true)
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<Result<T, StoreError>> {
    if !path.exists() {
        return None;
    }
    let load = || -> Result<T, StoreError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    };
    Some(load())
}

fn save_json<T: serde::Serialize + ?Sized>(
    root: &Path,
    path: PathBuf,
    value: &T,
) -> Result<PathBuf, StoreError> {
    std::fs::create_dir_all(root)?;
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, text)?;
    Ok(path)
}
