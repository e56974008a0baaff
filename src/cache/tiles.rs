//! Tile Operations
//!
//! Tiles are JSON objects addressed by their retrieval identifier `src`; every
//! other field is opaque payload.

use serde_json::Value;

use crate::cache::{OfflineCache, TILE_COLLECTION, TILE_KEY_PATH};
use crate::error::{CacheError, Result};
use crate::storage::StorageEngine;

impl<E: StorageEngine> OfflineCache<E> {
    /// Stores a tile, replacing any tile with the same `src`.
    pub async fn add_tile(&self, tile: Value) -> Result<Value> {
        validate_tile(&tile)?;
        self.put(TILE_COLLECTION, tile).await
    }

    pub async fn get_tile(&self, src: &str) -> Result<Option<Value>> {
        self.get(TILE_COLLECTION, src).await
    }

    pub async fn remove_tile(&self, src: &str) -> Result<String> {
        self.remove(TILE_COLLECTION, src).await
    }

    pub async fn tile_count(&self) -> Result<usize> {
        self.count(TILE_COLLECTION).await
    }
}

fn validate_tile(tile: &Value) -> Result<()> {
    match tile.get(TILE_KEY_PATH) {
        Some(Value::String(src)) if !src.is_empty() => Ok(()),
        _ => Err(CacheError::InvalidRecord(format!(
            "Tile must be an object with a non-empty string '{TILE_KEY_PATH}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::OfflineCache;
    use crate::error::CacheError;
    use crate::storage::MemoryEngine;
    use futures::future::join_all;
    use serde_json::json;

    async fn open_cache() -> OfflineCache<MemoryEngine> {
        let mut cache = OfflineCache::new(MemoryEngine::new(), "tiles", None);
        cache.open().await.unwrap();
        cache
    }

    #[tokio::test]
    async fn test_set_and_get_tile() {
        let cache = open_cache().await;

        cache.add_tile(json!({"src": "a1", "data": "d2"})).await.unwrap();

        let tile = cache.get_tile("a1").await.unwrap().unwrap();
        assert_eq!(tile["data"], "d2");
    }

    #[tokio::test]
    async fn test_ten_tiles() {
        let cache = open_cache().await;

        let adds = (0..10).map(|i| cache.add_tile(json!({"src": i.to_string(), "value": i})));
        for result in join_all(adds).await {
            result.unwrap();
        }

        assert_eq!(cache.tile_count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_remove_tile() {
        let cache = open_cache().await;

        cache.add_tile(json!({"src": "src"})).await.unwrap();
        let key = cache.remove_tile("src").await.unwrap();

        assert_eq!(key, "src");
        assert_eq!(cache.tile_count().await.unwrap(), 0);
        assert!(cache.get_tile("src").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_tiles_rejected() {
        let cache = open_cache().await;

        for tile in [json!({"data": 1}), json!({"src": ""}), json!({"src": 5}), json!("a")] {
            let result = cache.add_tile(tile).await;
            assert!(matches!(result, Err(CacheError::InvalidRecord(_))));
        }
        assert_eq!(cache.tile_count().await.unwrap(), 0);
    }
}
