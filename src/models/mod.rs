//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    check_ordered_range, SetRequest, MAX_KEY_LENGTH, MAX_ORDERED_VALUE, MAX_VALUE_SIZE,
};
pub use responses::{
    ContainsResponse, DeleteResponse, ErrorResponse, GetResponse, HealthResponse, SetResponse,
    StatsResponse,
};
