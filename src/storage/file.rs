//! File Engine Module
//!
//! Persistent storage engine writing one JSON snapshot file per database.
//! Every write commit rewrites the snapshot before it becomes visible, so
//! committed data survives process restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::storage::engine::{SchemaUpgrade, StorageEngine};
use crate::storage::state::{open_local, DatabaseState, LocalDatabase, SharedState};
use crate::storage::{StorageError, StorageResult};

/// Extension of snapshot files under the engine root.
const SNAPSHOT_EXTENSION: &str = "json";

// == File Engine ==
/// Engine rooted at a directory, storing database `name` in `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileEngine {
    root: PathBuf,
    /// Databases already loaded by this engine
    databases: Arc<Mutex<HashMap<String, SharedState>>>,
}

impl FileEngine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            databases: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the snapshot path for `name`, rejecting names that are not a
    /// single plain file name.
    pub fn snapshot_path(&self, name: &str) -> StorageResult<PathBuf> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if invalid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{name}.{SNAPSHOT_EXTENSION}")))
    }
}

/// Reads a snapshot, treating a missing file as an empty database.
async fn load_snapshot(path: &Path) -> StorageResult<DatabaseState> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No snapshot found, starting empty");
            Ok(DatabaseState::default())
        }
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl StorageEngine for FileEngine {
    type Database = LocalDatabase;

    async fn open(
        &self,
        name: &str,
        version: u32,
        upgrade: &(dyn for<'s, 'u> Fn(&'s mut SchemaUpgrade<'u>) -> StorageResult<()> + Send + Sync),
    ) -> StorageResult<LocalDatabase> {
        let path = self.snapshot_path(name)?;

        let state = {
            let mut databases = self.databases.lock().await;
            match databases.get(name) {
                Some(state) => Arc::clone(state),
                None => {
                    tokio::fs::create_dir_all(&self.root).await?;
                    let loaded = load_snapshot(&path).await?;
                    info!(
                        database = name,
                        path = %path.display(),
                        version = loaded.version,
                        "Snapshot loaded"
                    );
                    let state = Arc::new(RwLock::new(loaded));
                    databases.insert(name.to_string(), Arc::clone(&state));
                    state
                }
            }
        };

        open_local(name, version, state, Some(path), upgrade).await
    }
}
