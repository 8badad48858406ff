//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair with optional priority and expiry
//! - `GET /get/:key` - Retrieve an entry by key
//! - `DELETE /del/:key` - Delete a key
//! - `GET /contains/:key` - Membership check
//! - `GET /stats` - Get cache statistics
//! - `GET /dump` - Plain-text listing of all entries
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
