//! Error types for the offline cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorResponse;
use crate::storage::StorageError;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the offline cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache was constructed with an unusable configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation issued while no database handle is open
    #[error("Cache is not open: {0}")]
    NotOpen(String),

    /// `open` called on a cache that already holds a handle
    #[error("Cache is already open: {0}")]
    AlreadyOpen(String),

    /// Record rejected before reaching the storage engine
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Engine failure, passed through unchanged
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Stored record does not have the expected shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    fn status_code(&self) -> StatusCode {
        match self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRecord(_) => StatusCode::BAD_REQUEST,
            CacheError::Storage(StorageError::KeyPathMissing(_)) => StatusCode::BAD_REQUEST,
            CacheError::NotOpen(_) | CacheError::AlreadyOpen(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Storage(StorageError::Closed(_)) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::InvalidConfig(_)
            | CacheError::Storage(_)
            | CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the offline cache.
pub type Result<T> = std::result::Result<T, CacheError>;
