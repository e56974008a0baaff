//! Storage Engine Interface
//!
//! Abstract, asynchronous, transactional key-value store that the cache is built on.
//! An engine opens named, versioned databases; a database hands out transactions
//! scoped to one collection.

use async_trait::async_trait;
use serde_json::Value;

use crate::storage::state::{CollectionState, DatabaseState};
use crate::storage::{StorageError, StorageResult};

// == Transaction Mode ==
/// Access mode declared when a transaction is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    ReadOnly,
    ReadWrite,
}

// == Schema Upgrade ==
/// View over a database while it is being upgraded to a newer version.
///
/// Collections can only be created through this type, which engines hand to the
/// upgrade callback passed to [`StorageEngine::open`].
#[derive(Debug)]
pub struct SchemaUpgrade<'a> {
    state: &'a mut DatabaseState,
    old_version: u32,
    new_version: u32,
}

impl<'a> SchemaUpgrade<'a> {
    pub(crate) fn new(state: &'a mut DatabaseState, old_version: u32, new_version: u32) -> Self {
        Self {
            state,
            old_version,
            new_version,
        }
    }

    /// Version the database had before this upgrade (0 for a new database).
    pub fn old_version(&self) -> u32 {
        self.old_version
    }

    /// Version the database will have once the upgrade completes.
    pub fn new_version(&self) -> u32 {
        self.new_version
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.state.collections.contains_key(name)
    }

    /// Creates an empty collection whose records are addressed by `key_path`.
    pub fn create_collection(&mut self, name: &str, key_path: &str) -> StorageResult<()> {
        if self.has_collection(name) {
            return Err(StorageError::CollectionExists(name.to_string()));
        }
        self.state
            .collections
            .insert(name.to_string(), CollectionState::new(key_path));
        Ok(())
    }
}

// == Storage Engine ==
/// Opens named, versioned databases.
#[async_trait]
pub trait StorageEngine: Send + Sync + 'static {
    type Database: Database;

    /// Opens (creating if absent) the database `name` at `version`.
    ///
    /// When the database is new or stored at a lower version, `upgrade` runs
    /// before the handle is returned. If it fails, the stored database is left
    /// unchanged. Opening at a lower version than the stored one fails with
    /// [`StorageError::VersionConflict`].
    async fn open(
        &self,
        name: &str,
        version: u32,
        upgrade: &(dyn for<'s, 'u> Fn(&'s mut SchemaUpgrade<'u>) -> StorageResult<()> + Send + Sync),
    ) -> StorageResult<Self::Database>;
}

// == Database ==
/// Handle to an open database.
#[async_trait]
pub trait Database: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn version(&self) -> u32;

    async fn collection_names(&self) -> StorageResult<Vec<String>>;

    /// Starts a transaction against a single collection.
    async fn transaction(
        &self,
        collection: &str,
        mode: TransactionMode,
    ) -> StorageResult<Box<dyn Transaction>>;

    /// Closes the handle. Later calls on it fail with [`StorageError::Closed`].
    async fn close(&self) -> StorageResult<()>;
}

// == Transaction ==
/// A unit of work against one collection.
///
/// Writes become visible to other transactions only after [`Transaction::commit`].
/// Dropping a transaction without committing aborts it.
#[async_trait]
pub trait Transaction: Send {
    fn mode(&self) -> TransactionMode;

    /// Inserts or overwrites the record with the same primary key. Returns the key.
    async fn put(&mut self, record: &Value) -> StorageResult<String>;

    async fn get(&mut self, key: &str) -> StorageResult<Option<Value>>;

    async fn get_all(&mut self) -> StorageResult<Vec<Value>>;

    /// Deletes the record with `key`. Deleting an absent key succeeds.
    async fn delete(&mut self, key: &str) -> StorageResult<()>;

    async fn count(&mut self) -> StorageResult<usize>;

    async fn commit(&mut self) -> StorageResult<()>;
}
