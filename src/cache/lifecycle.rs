//! Cache Lifecycle Module
//!
//! Owns the database handle and moves the cache between its closed and open states.

use tracing::{error, info};

use crate::cache::keygen::{KeyGenerator, RandomKeyGenerator};
use crate::cache::{DEFAULT_VERSION, EDIT_COLLECTION, EDIT_KEY_PATH, TILE_COLLECTION, TILE_KEY_PATH};
use crate::error::{CacheError, Result};
use crate::storage::{Database, SchemaUpgrade, StorageEngine, StorageResult};

// == Offline Cache ==
/// Persistent cache of map tiles and unsynced edits.
///
/// Created closed. Every data operation requires a prior successful [`open`]
/// and fails with [`CacheError::NotOpen`] otherwise.
///
/// [`open`]: OfflineCache::open
pub struct OfflineCache<E: StorageEngine> {
    engine: E,
    name: String,
    version: u32,
    key_generator: Box<dyn KeyGenerator>,
    database: Option<E::Database>,
}

impl<E: StorageEngine> OfflineCache<E> {
    // == Constructor ==
    /// Creates a closed cache for database `name`.
    ///
    /// `version` defaults to 1. An empty name is logged here and makes every
    /// later [`open`](OfflineCache::open) fail.
    pub fn new(engine: E, name: impl Into<String>, version: Option<u32>) -> Self {
        let name = name.into();
        if name.is_empty() {
            error!("Database name must be given");
        }

        Self {
            engine,
            name,
            version: version.unwrap_or(DEFAULT_VERSION),
            key_generator: Box::new(RandomKeyGenerator),
            database: None,
        }
    }

    /// Replaces the generator used for edit keys.
    pub fn with_key_generator(mut self, key_generator: impl KeyGenerator + 'static) -> Self {
        self.key_generator = Box::new(key_generator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_open(&self) -> bool {
        self.database.is_some()
    }

    // == Open ==
    /// Opens the database, creating the tile and edit collections when the
    /// database is new or stored at a lower version.
    pub async fn open(&mut self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CacheError::InvalidConfig(
                "Database name must be given".to_string(),
            ));
        }
        if self.database.is_some() {
            return Err(CacheError::AlreadyOpen(self.name.clone()));
        }

        let database = self
            .engine
            .open(&self.name, self.version, &create_schema)
            .await?;

        info!(database = %self.name, version = self.version, "Cache opened");
        self.database = Some(database);
        Ok(())
    }

    // == Close ==
    /// Closes the database handle. The cache can be opened again afterwards.
    pub async fn close(&mut self) -> Result<()> {
        let database = self
            .database
            .take()
            .ok_or_else(|| CacheError::NotOpen(self.name.clone()))?;

        database.close().await?;
        info!(database = %self.name, "Cache closed");
        Ok(())
    }

    pub(crate) fn database(&self) -> Result<&E::Database> {
        self.database
            .as_ref()
            .ok_or_else(|| CacheError::NotOpen(self.name.clone()))
    }

    pub(crate) fn key_generator(&self) -> &dyn KeyGenerator {
        self.key_generator.as_ref()
    }
}

/// Creates whichever of the two collections the database does not have yet.
fn create_schema(schema: &mut SchemaUpgrade<'_>) -> StorageResult<()> {
    for (collection, key_path) in [
        (TILE_COLLECTION, TILE_KEY_PATH),
        (EDIT_COLLECTION, EDIT_KEY_PATH),
    ] {
        if !schema.has_collection(collection) {
            schema.create_collection(collection, key_path)?;
        }
    }
    Ok(())
}
