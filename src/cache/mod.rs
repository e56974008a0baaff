//! Cache Module
//!
//! Persistent offline cache holding two collections: retrieved map tiles and
//! locally authored edits that have not been synced yet.
//!
//! # Layers
//! - Lifecycle: opening and closing the versioned database handle
//! - Records: collection-agnostic put/get/get_all/remove/count
//! - Tiles and edits: collection-specific semantics on top of records

mod edits;
mod keygen;
mod lifecycle;
mod records;
mod tiles;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use edits::{current_timestamp_ms, EditEnvelope, EditList, EditOptions};
pub use keygen::{KeyGenerator, RandomKeyGenerator, KEY_FRAGMENT_LENGTH};
pub use lifecycle::OfflineCache;

// == Public Constants ==
/// Collection holding tile records
pub const TILE_COLLECTION: &str = "tile";

/// Primary key field of tile records
pub const TILE_KEY_PATH: &str = "src";

/// Collection holding edit envelopes
pub const EDIT_COLLECTION: &str = "edit";

/// Primary key field of edit envelopes
pub const EDIT_KEY_PATH: &str = "key";

/// Database version used when none is given
pub const DEFAULT_VERSION: u32 = 1;
