//! Request and Response models for the cache HTTP API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.
//! Tile bodies are passed through as raw JSON and have no DTO.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{AddEditRequest, ListEditsQuery};
pub use responses::{AddEditResponse, ErrorResponse, HealthResponse, RemoveResponse, StatsResponse};
