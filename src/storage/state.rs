//! Local Database Module
//!
//! In-process database state shared by the memory and file engines, plus the
//! database handle and transaction types that operate on it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, info};

use crate::storage::engine::{Database, SchemaUpgrade, Transaction, TransactionMode};
use crate::storage::{StorageError, StorageResult};

/// Signature of the callback run while a database is upgraded.
pub(crate) type UpgradeFn<'a> =
    &'a (dyn for<'s, 'u> Fn(&'s mut SchemaUpgrade<'u>) -> StorageResult<()> + Send + Sync);

/// Database state guarded by the engine's per-database lock.
pub(crate) type SharedState = Arc<RwLock<DatabaseState>>;

// == Database State ==
/// Complete contents of one database. This is also the snapshot file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseState {
    /// Schema version, 0 until the first upgrade completes
    pub version: u32,
    /// Collections by name
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionState>,
}

/// Records of one collection, ordered by primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionState {
    /// Field holding each record's primary key
    pub key_path: String,
    #[serde(default)]
    pub records: BTreeMap<String, Value>,
}

impl CollectionState {
    pub fn new(key_path: &str) -> Self {
        Self {
            key_path: key_path.to_string(),
            records: BTreeMap::new(),
        }
    }
}

// == Open ==
/// Opens a database over `state`, running `upgrade` when `version` is newer
/// than the stored one. The upgrade works on a copy, so a failing callback or
/// snapshot write leaves `state` as it was.
pub(crate) async fn open_local(
    name: &str,
    version: u32,
    state: SharedState,
    snapshot: Option<PathBuf>,
    upgrade: UpgradeFn<'_>,
) -> StorageResult<LocalDatabase> {
    if version == 0 {
        return Err(StorageError::InvalidVersion(version));
    }

    {
        let mut guard = state.write().await;
        let current = guard.version;

        if version < current {
            return Err(StorageError::VersionConflict {
                requested: version,
                current,
            });
        }

        if version > current {
            let mut next = guard.clone();
            upgrade(&mut SchemaUpgrade::new(&mut next, current, version))?;
            next.version = version;

            if let Some(path) = &snapshot {
                write_snapshot(path, &next).await?;
            }

            *guard = next;
            info!(database = name, from = current, to = version, "Database upgraded");
        }
    }

    Ok(LocalDatabase {
        name: name.to_string(),
        version,
        state,
        snapshot,
        closed: AtomicBool::new(false),
    })
}

// == Snapshot ==
/// Writes `state` to `path` through a temporary file so readers never see a
/// partially written snapshot.
pub(crate) async fn write_snapshot(path: &Path, state: &DatabaseState) -> StorageResult<()> {
    let bytes = serde_json::to_vec(state)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

// == Local Database ==
/// Handle to a database held in process memory, optionally mirrored to a snapshot file.
#[derive(Debug)]
pub struct LocalDatabase {
    name: String,
    version: u32,
    state: SharedState,
    /// Snapshot file rewritten on every write commit
    snapshot: Option<PathBuf>,
    closed: AtomicBool,
}

impl LocalDatabase {
    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StorageError::Closed(self.name.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl Database for LocalDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> u32 {
        self.version
    }

    async fn collection_names(&self) -> StorageResult<Vec<String>> {
        self.ensure_open()?;
        let state = self.state.read().await;
        Ok(state.collections.keys().cloned().collect())
    }

    async fn transaction(
        &self,
        collection: &str,
        mode: TransactionMode,
    ) -> StorageResult<Box<dyn Transaction>> {
        self.ensure_open()?;

        let access = match mode {
            TransactionMode::ReadOnly => Access::Read(Arc::clone(&self.state).read_owned().await),
            TransactionMode::ReadWrite => {
                Access::Write(Arc::clone(&self.state).write_owned().await)
            }
        };

        let key_path = access
            .state()
            .collections
            .get(collection)
            .map(|c| c.key_path.clone())
            .ok_or_else(|| StorageError::UnknownCollection(collection.to_string()))?;

        Ok(Box::new(LocalTransaction {
            access,
            collection: collection.to_string(),
            key_path,
            pending: BTreeMap::new(),
            snapshot: self.snapshot.clone(),
            finished: false,
        }))
    }

    async fn close(&self) -> StorageResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(StorageError::Closed(self.name.clone()));
        }
        info!(database = %self.name, "Database closed");
        Ok(())
    }
}

// == Local Transaction ==
/// Lock held for the lifetime of a transaction.
enum Access {
    Read(OwnedRwLockReadGuard<DatabaseState>),
    Write(OwnedRwLockWriteGuard<DatabaseState>),
}

impl Access {
    fn state(&self) -> &DatabaseState {
        match self {
            Access::Read(guard) => &**guard,
            Access::Write(guard) => &**guard,
        }
    }
}

/// Transaction over one collection.
///
/// Writes are staged in `pending` (`None` marks a delete) and applied on commit.
pub struct LocalTransaction {
    access: Access,
    collection: String,
    key_path: String,
    pending: BTreeMap<String, Option<Value>>,
    snapshot: Option<PathBuf>,
    finished: bool,
}

impl LocalTransaction {
    fn ensure_active(&self) -> StorageResult<()> {
        if self.finished {
            return Err(StorageError::Finished);
        }
        Ok(())
    }

    fn ensure_writable(&self) -> StorageResult<()> {
        self.ensure_active()?;
        if self.mode() == TransactionMode::ReadOnly {
            return Err(StorageError::ReadOnly);
        }
        Ok(())
    }

    fn records(&self) -> StorageResult<&BTreeMap<String, Value>> {
        self.access
            .state()
            .collections
            .get(&self.collection)
            .map(|c| &c.records)
            .ok_or_else(|| StorageError::UnknownCollection(self.collection.clone()))
    }

    /// Committed records overlaid with this transaction's staged writes.
    fn visible(&self) -> StorageResult<BTreeMap<&str, &Value>> {
        let mut visible: BTreeMap<&str, &Value> = self
            .records()?
            .iter()
            .map(|(key, record)| (key.as_str(), record))
            .collect();

        for (key, staged) in &self.pending {
            match staged {
                Some(record) => {
                    visible.insert(key.as_str(), record);
                }
                None => {
                    visible.remove(key.as_str());
                }
            }
        }
        Ok(visible)
    }
}

/// Applies `changes` to `records`, returning the changes that undo them.
fn apply_changes(
    records: &mut BTreeMap<String, Value>,
    changes: impl IntoIterator<Item = (String, Option<Value>)>,
) -> Vec<(String, Option<Value>)> {
    changes
        .into_iter()
        .map(|(key, change)| {
            let previous = match change {
                Some(record) => records.insert(key.clone(), record),
                None => records.remove(&key),
            };
            (key, previous)
        })
        .collect()
}

#[async_trait]
impl Transaction for LocalTransaction {
    fn mode(&self) -> TransactionMode {
        match self.access {
            Access::Read(_) => TransactionMode::ReadOnly,
            Access::Write(_) => TransactionMode::ReadWrite,
        }
    }

    async fn put(&mut self, record: &Value) -> StorageResult<String> {
        self.ensure_writable()?;

        let key = record
            .get(self.key_path.as_str())
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or_else(|| StorageError::KeyPathMissing(self.key_path.clone()))?;

        self.pending.insert(key.clone(), Some(record.clone()));
        Ok(key)
    }

    async fn get(&mut self, key: &str) -> StorageResult<Option<Value>> {
        self.ensure_active()?;
        match self.pending.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => Ok(self.records()?.get(key).cloned()),
        }
    }

    async fn get_all(&mut self) -> StorageResult<Vec<Value>> {
        self.ensure_active()?;
        Ok(self.visible()?.into_values().cloned().collect())
    }

    async fn delete(&mut self, key: &str) -> StorageResult<()> {
        self.ensure_writable()?;
        self.pending.insert(key.to_string(), None);
        Ok(())
    }

    async fn count(&mut self) -> StorageResult<usize> {
        self.ensure_active()?;
        Ok(self.visible()?.len())
    }

    async fn commit(&mut self) -> StorageResult<()> {
        self.ensure_active()?;
        self.finished = true;

        if self.pending.is_empty() {
            return Ok(());
        }

        let pending = std::mem::take(&mut self.pending);
        let changed = pending.len();
        let Access::Write(guard) = &mut self.access else {
            return Err(StorageError::ReadOnly);
        };
        let state: &mut DatabaseState = guard;

        let undo = {
            let collection = state
                .collections
                .get_mut(&self.collection)
                .ok_or_else(|| StorageError::UnknownCollection(self.collection.clone()))?;
            apply_changes(&mut collection.records, pending)
        };

        if let Some(path) = &self.snapshot {
            if let Err(err) = write_snapshot(path, state).await {
                if let Some(collection) = state.collections.get_mut(&self.collection) {
                    apply_changes(&mut collection.records, undo.into_iter().rev());
                }
                return Err(err);
            }
        }

        debug!(collection = %self.collection, changed, "Transaction committed");
        Ok(())
    }
}

impl Drop for LocalTransaction {
    fn drop(&mut self) {
        if !self.finished && !self.pending.is_empty() {
            debug!(
                collection = %self.collection,
                discarded = self.pending.len(),
                "Transaction aborted"
            );
        }
    }
}
