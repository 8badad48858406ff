//! Error types for the cache and its HTTP surface
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Queue Error Enum ==
/// Failures reported by the indexed priority queue.
///
/// None of these escape the cache's public operations; the cache turns them
/// into absence (`None` / `false`) or logs them as consistency faults.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Push attempted while the queue holds `capacity` entries
    #[error("no free slots in the queue")]
    NoFreeSlots,

    /// Push of a key that is already queued
    #[error("key is already in the queue")]
    DuplicateKey,

    /// Pop, peek or remove on an empty queue
    #[error("no items in the queue")]
    EmptyQueue,

    /// Remove for a key the queue does not hold
    #[error("no item with such key in the queue")]
    NoSuchKey,
}

// == Cache Error Enum ==
/// Unified error type for the cache service.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cache constructed with a capacity it cannot honour
    #[error("Invalid capacity: {0} (must be greater than zero)")]
    InvalidCapacity(usize),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidCapacity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache service.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidCapacity(0), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_queue_error_messages() {
        assert_eq!(QueueError::NoFreeSlots.to_string(), "no free slots in the queue");
        assert_eq!(QueueError::DuplicateKey.to_string(), "key is already in the queue");
        assert_eq!(QueueError::EmptyQueue.to_string(), "no items in the queue");
        assert_eq!(
            QueueError::NoSuchKey.to_string(),
            "no item with such key in the queue"
        );
    }
}
