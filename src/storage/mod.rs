//! Storage Module
//!
//! Transactional key-value engines the cache persists into.
//!
//! # Engines
//! - `MemoryEngine`: process-local, used by tests and ephemeral caches
//! - `FileEngine`: JSON snapshot per database, survives restarts

mod engine;
mod error;
mod file;
mod memory;
mod state;

pub use engine::{Database, SchemaUpgrade, StorageEngine, Transaction, TransactionMode};
pub use error::{StorageError, StorageResult};
pub use file::FileEngine;
pub use memory::MemoryEngine;
pub use state::{CollectionState, DatabaseState, LocalDatabase, LocalTransaction};
