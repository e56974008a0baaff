//! API Module
//!
//! HTTP handlers and routing that expose the cache to local clients.
//!
//! # Endpoints
//! - `PUT /tiles` - Store a tile record
//! - `GET /tiles/:src` - Retrieve a tile by its percent-encoded `src`
//! - `DELETE /tiles/:src` - Remove a tile
//! - `PUT /edits` - Store an edit
//! - `GET /edits` - List edits in timestamp order
//! - `DELETE /edits/:key` - Remove an edit
//! - `GET /stats` - Tile and edit counts
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
