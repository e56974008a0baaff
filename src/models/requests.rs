//! Request DTOs for the cache HTTP API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::EditOptions;

/// Request body for adding an edit (PUT /edits)
///
/// # Fields
/// - `edit`: The edit payload, any JSON value
/// - `replace`: Skip the insert if an equal edit is stored (default: true)
/// - `timestamp`: Optional timestamp in milliseconds (default: now)
#[derive(Debug, Clone, Deserialize)]
pub struct AddEditRequest {
    /// The edit payload
    pub edit: Value,
    #[serde(default = "default_replace")]
    pub replace: bool,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

fn default_replace() -> bool {
    true
}

impl AddEditRequest {
    /// Options for the cache call described by this request
    pub fn options(&self) -> EditOptions {
        EditOptions {
            replace: self.replace,
            timestamp: self.timestamp,
        }
    }
}

/// Query string for listing edits (GET /edits)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEditsQuery {
    /// Return full envelopes instead of payloads
    #[serde(default)]
    pub keep_meta: bool,
}
