//! Edit Operations
//!
//! Edits authored offline are wrapped in an envelope carrying a synthetic key and
//! a timestamp, optionally deduplicated on insert, and read back in timestamp order.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{OfflineCache, EDIT_COLLECTION, EDIT_KEY_PATH};
use crate::error::Result;
use crate::storage::StorageEngine;

// == Edit Envelope ==
/// Stored wrapper around a caller's edit payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditEnvelope {
    /// Synthetic primary key, `<timestamp>_<fragment>`
    pub key: String,
    /// Milliseconds since the Unix epoch, used only for ordering
    pub timestamp: i64,
    /// Caller-defined payload
    pub edit: Value,
}

// == Edit Options ==
/// Options for [`OfflineCache::add_edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOptions {
    /// Skip the insert when an equal payload is already stored
    pub replace: bool,
    /// Timestamp to store; the current time when `None`
    pub timestamp: Option<i64>,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            replace: true,
            timestamp: None,
        }
    }
}

impl EditOptions {
    /// Options that always insert, without the duplicate scan.
    pub fn append() -> Self {
        Self {
            replace: false,
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

// == Edit List ==
/// Result of [`OfflineCache::get_all_edits`], ordered by ascending timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EditList {
    /// Payloads only
    Payloads(Vec<Value>),
    /// Full envelopes including key and timestamp
    Envelopes(Vec<EditEnvelope>),
}

impl EditList {
    pub fn len(&self) -> usize {
        match self {
            EditList::Payloads(edits) => edits.len(),
            EditList::Envelopes(envelopes) => envelopes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the payloads, dropping envelope metadata if present.
    pub fn into_payloads(self) -> Vec<Value> {
        match self {
            EditList::Payloads(edits) => edits,
            EditList::Envelopes(envelopes) => envelopes.into_iter().map(|e| e.edit).collect(),
        }
    }
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl<E: StorageEngine> OfflineCache<E> {
    // == Add Edit ==
    /// Stores `edit` in a new envelope and returns the payload.
    ///
    /// With `options.replace` set (the default), all stored edits are read and
    /// compared by value first; if an equal payload exists, nothing is inserted
    /// and the given payload is returned as is. The scan is linear in the number
    /// of stored edits, which stays small between syncs. The scan and the insert
    /// are separate transactions, so concurrent calls can both insert.
    pub async fn add_edit(&self, edit: Value, options: EditOptions) -> Result<Value> {
        let timestamp = options.timestamp.unwrap_or_else(current_timestamp_ms);
        let key = self.key_generator().generate(timestamp);

        if options.replace {
            let stored = self.stored_envelopes().await?;
            if stored.iter().any(|envelope| same_content(&envelope.edit, &edit)) {
                debug!(timestamp, "Duplicate edit skipped");
                return Ok(edit);
            }
        }

        let envelope = EditEnvelope {
            key,
            timestamp,
            edit,
        };
        self.put(EDIT_COLLECTION, serde_json::to_value(&envelope)?)
            .await?;
        Ok(envelope.edit)
    }

    // == Get All Edits ==
    /// Returns all edits ordered by ascending timestamp, as payloads or, with
    /// `keep_meta`, as full envelopes.
    pub async fn get_all_edits(&self, keep_meta: bool) -> Result<EditList> {
        if keep_meta {
            Ok(EditList::Envelopes(self.edit_envelopes().await?))
        } else {
            Ok(EditList::Payloads(self.edits().await?))
        }
    }

    /// Returns all edit payloads ordered by ascending timestamp.
    pub async fn edits(&self) -> Result<Vec<Value>> {
        let envelopes = self.edit_envelopes().await?;
        Ok(envelopes.into_iter().map(|envelope| envelope.edit).collect())
    }

    /// Returns all edit envelopes ordered by ascending timestamp.
    ///
    /// The sort is stable: envelopes with equal timestamps keep the engine's
    /// iteration order.
    pub async fn edit_envelopes(&self) -> Result<Vec<EditEnvelope>> {
        let mut envelopes = self.stored_envelopes().await?;
        envelopes.sort_by_key(|envelope| envelope.timestamp);
        Ok(envelopes)
    }

    pub async fn remove_edit(&self, key: &str) -> Result<String> {
        self.remove(EDIT_COLLECTION, key).await
    }

    pub async fn edit_count(&self) -> Result<usize> {
        self.count(EDIT_COLLECTION).await
    }

    /// Reads every envelope, skipping records that do not have the envelope shape.
    async fn stored_envelopes(&self) -> Result<Vec<EditEnvelope>> {
        let records = self.get_all(EDIT_COLLECTION).await?;
        let envelopes = records
            .into_iter()
            .filter_map(|record| {
                let key = record.get(EDIT_KEY_PATH).cloned();
                match serde_json::from_value::<EditEnvelope>(record) {
                    Ok(envelope) => Some(envelope),
                    Err(err) => {
                        warn!(key = ?key, error = %err, "Skipping malformed edit record");
                        None
                    }
                }
            })
            .collect();
        Ok(envelopes)
    }
}

/// Deep equality by content. Numbers compare by value, so `1` equals `1.0`.
fn same_content(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            match (x.as_i64(), y.as_i64(), x.as_u64(), y.as_u64()) {
                (Some(x), Some(y), _, _) => x == y,
                (_, _, Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_content(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| same_content(x, y)))
        }
        _ => a == b,
    }
}
