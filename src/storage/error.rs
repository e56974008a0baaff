//! Storage Error Module
//!
//! Errors reported by storage engines. The cache layer passes these through unchanged.

use std::io;

use thiserror::Error;

// == Storage Error Enum ==
/// Errors that can occur while opening a database or running a transaction.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The database name is empty or cannot be mapped onto the engine
    #[error("Invalid database name: {0:?}")]
    InvalidName(String),

    /// Versions start at 1
    #[error("Invalid database version: {0}")]
    InvalidVersion(u32),

    /// Requested version is lower than the stored one
    #[error("Version conflict: requested {requested}, stored {current}")]
    VersionConflict { requested: u32, current: u32 },

    /// No collection with this name exists in the database
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// A collection with this name already exists
    #[error("Collection already exists: {0}")]
    CollectionExists(String),

    /// Record has no usable value at the collection's key path
    #[error("Record is missing a non-empty string at key path '{0}'")]
    KeyPathMissing(String),

    /// Write attempted inside a read-only transaction
    #[error("Transaction is read-only")]
    ReadOnly,

    /// Transaction was already committed
    #[error("Transaction already finished")]
    Finished,

    /// The database handle has been closed
    #[error("Database is closed: {0}")]
    Closed(String),

    /// Snapshot file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot file could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
