//! API Handlers
//!
//! HTTP request handlers for each cache endpoint. Each handler is a thin
//! adapter over one cache operation.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{EditList, OfflineCache};
use crate::error::{CacheError, Result};
use crate::models::{
    AddEditRequest, AddEditResponse, HealthResponse, ListEditsQuery, RemoveResponse, StatsResponse,
};
use crate::storage::StorageEngine;

/// Application state shared across all handlers.
///
/// The cache is opened before it is shared, so handlers only need `&self` access.
pub struct AppState<E: StorageEngine> {
    /// Open cache
    pub cache: Arc<OfflineCache<E>>,
}

impl<E: StorageEngine> AppState<E> {
    /// Creates a new AppState around an opened cache.
    pub fn new(cache: OfflineCache<E>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }
}

impl<E: StorageEngine> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

/// Handler for PUT /tiles
pub async fn put_tile_handler<E: StorageEngine>(
    State(state): State<AppState<E>>,
    Json(tile): Json<Value>,
) -> Result<Json<Value>> {
    let stored = state.cache.add_tile(tile).await?;
    Ok(Json(stored))
}

/// Handler for GET /tiles/:src
pub async fn get_tile_handler<E: StorageEngine>(
    State(state): State<AppState<E>>,
    Path(src): Path<String>,
) -> Result<Json<Value>> {
    let tile = state.cache.get_tile(&src).await?;
    tile.map(Json).ok_or(CacheError::NotFound(src))
}

/// Handler for DELETE /tiles/:src
pub async fn delete_tile_handler<E: StorageEngine>(
    State(state): State<AppState<E>>,
    Path(src): Path<String>,
) -> Result<Json<RemoveResponse>> {
    let key = state.cache.remove_tile(&src).await?;
    Ok(Json(RemoveResponse::new(key)))
}

/// Handler for PUT /edits
pub async fn put_edit_handler<E: StorageEngine>(
    State(state): State<AppState<E>>,
    Json(req): Json<AddEditRequest>,
) -> Result<Json<AddEditResponse>> {
    let options = req.options();
    let edit = state.cache.add_edit(req.edit, options).await?;
    Ok(Json(AddEditResponse { edit }))
}

/// Handler for GET /edits?keep_meta=bool
pub async fn list_edits_handler<E: StorageEngine>(
    State(state): State<AppState<E>>,
    Query(query): Query<ListEditsQuery>,
) -> Result<Json<EditList>> {
    let edits = state.cache.get_all_edits(query.keep_meta).await?;
    Ok(Json(edits))
}

/// Handler for DELETE /edits/:key
pub async fn delete_edit_handler<E: StorageEngine>(
    State(state): State<AppState<E>>,
    Path(key): Path<String>,
) -> Result<Json<RemoveResponse>> {
    let key = state.cache.remove_edit(&key).await?;
    Ok(Json(RemoveResponse::new(key)))
}

/// Handler for GET /stats
pub async fn stats_handler<E: StorageEngine>(
    State(state): State<AppState<E>>,
) -> Result<Json<StatsResponse>> {
    let tiles = state.cache.tile_count().await?;
    let edits = state.cache.edit_count().await?;
    Ok(Json(StatsResponse { tiles, edits }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
