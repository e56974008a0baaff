//! Offline Cache - A persistent local store for map tiles and unsynced edits
//!
//! Keeps retrieved tiles and locally authored edits in a versioned,
//! transactional key-value database so they survive restarts.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use api::AppState;
pub use cache::OfflineCache;
pub use config::Config;
pub use error::CacheError;
pub use storage::{FileEngine, MemoryEngine};
