//! Record Store Module
//!
//! Collection-agnostic primitives. Each call runs exactly one transaction, and
//! engine errors are returned as they were raised.

use serde_json::Value;
use tracing::debug;

use crate::cache::OfflineCache;
use crate::error::Result;
use crate::storage::{Database, StorageEngine, TransactionMode};

impl<E: StorageEngine> OfflineCache<E> {
    // == Put ==
    /// Inserts `record`, or overwrites the record with the same primary key.
    ///
    /// Returns the stored record.
    pub async fn put(&self, collection: &str, record: Value) -> Result<Value> {
        let mut tx = self
            .database()?
            .transaction(collection, TransactionMode::ReadWrite)
            .await?;
        let key = tx.put(&record).await?;
        tx.commit().await?;

        debug!(collection, key = %key, "Record stored");
        Ok(record)
    }

    // == Get ==
    /// Returns the record with primary key `key`, or `None` when absent.
    pub async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let mut tx = self
            .database()?
            .transaction(collection, TransactionMode::ReadOnly)
            .await?;
        let record = tx.get(key).await?;

        debug!(collection, key, found = record.is_some(), "Record lookup");
        Ok(record)
    }

    // == Get All ==
    /// Returns every record in the collection, in the engine's iteration order.
    pub async fn get_all(&self, collection: &str) -> Result<Vec<Value>> {
        let mut tx = self
            .database()?
            .transaction(collection, TransactionMode::ReadOnly)
            .await?;
        Ok(tx.get_all().await?)
    }

    // == Remove ==
    /// Deletes the record with primary key `key`. Succeeds when the key is absent.
    ///
    /// Returns the key.
    pub async fn remove(&self, collection: &str, key: &str) -> Result<String> {
        let mut tx = self
            .database()?
            .transaction(collection, TransactionMode::ReadWrite)
            .await?;
        tx.delete(key).await?;
        tx.commit().await?;

        debug!(collection, key, "Record removed");
        Ok(key.to_string())
    }

    // == Count ==
    pub async fn count(&self, collection: &str) -> Result<usize> {
        let mut tx = self
            .database()?
            .transaction(collection, TransactionMode::ReadOnly)
            .await?;
        Ok(tx.count().await?)
    }
}
