//! Memory Engine Module
//!
//! Storage engine keeping every database in process memory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::storage::engine::{SchemaUpgrade, StorageEngine};
use crate::storage::state::{open_local, LocalDatabase, SharedState};
use crate::storage::{StorageError, StorageResult};

// == Memory Engine ==
/// In-memory engine. Databases live as long as the engine (or any clone of it),
/// so reopening a name sees the data written through earlier handles.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    databases: Arc<Mutex<HashMap<String, SharedState>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageEngine for MemoryEngine {
    type Database = LocalDatabase;

    async fn open(
        &self,
        name: &str,
        version: u32,
        upgrade: &(dyn for<'s, 'u> Fn(&'s mut SchemaUpgrade<'u>) -> StorageResult<()> + Send + Sync),
    ) -> StorageResult<LocalDatabase> {
        if name.is_empty() {
            return Err(StorageError::InvalidName(name.to_string()));
        }

        let state = {
            let mut databases = self.databases.lock().await;
            Arc::clone(
                databases
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::new(RwLock::new(Default::default()))),
            )
        };

        open_local(name, version, state, None, upgrade).await
    }
}
