//! Response DTOs for the cache HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

/// Response body for adding an edit (PUT /edits)
#[derive(Debug, Clone, Serialize)]
pub struct AddEditResponse {
    /// The payload that was submitted
    pub edit: Value,
}

/// Response body for DELETE /tiles/:src and DELETE /edits/:key
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    /// Success message
    pub message: String,
    /// The key that was removed
    pub key: String,
}

impl RemoveResponse {
    /// Creates a new RemoveResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cached tiles
    pub tiles: usize,
    /// Number of unsynced edits
    pub edits: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_response_serialize() {
        let resp = RemoveResponse::new("tile/1/2/3");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("tile/1/2/3"));
        assert!(json.contains("removed"));
    }

    #[test]
    fn test_stats_response_serialize() {
        let resp = StatsResponse { tiles: 3, edits: 1 };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({"tiles": 3, "edits": 1}));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
