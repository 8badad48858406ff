//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// Largest priority or expiry the cache orders correctly; both are packed
/// into 32-bit halves of the queue sort key.
pub const MAX_ORDERED_VALUE: i64 = u32::MAX as i64;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `priority`: Optional eviction priority (server default if omitted)
/// - `ttl`: Optional lifetime in seconds, relative to now
/// - `expiry`: Optional absolute expiry in Unix seconds
///
/// `ttl` and `expiry` are mutually exclusive; with neither, the server's
/// default TTL applies.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub expiry: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        if self.value.len() > MAX_VALUE_SIZE {
            return Some(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            ));
        }
        if self.ttl.is_some() && self.expiry.is_some() {
            return Some("Specify either ttl or expiry, not both".to_string());
        }
        if let Some(priority) = self.priority {
            return check_ordered_range("priority", priority);
        }
        None
    }

    /// Absolute expiry for this request given the current time.
    pub fn resolve_expiry(&self, now: i64, default_ttl: u64) -> i64 {
        match (self.expiry, self.ttl) {
            (Some(expiry), _) => expiry,
            (None, ttl) => {
                let ttl = i64::try_from(ttl.unwrap_or(default_ttl)).unwrap_or(i64::MAX);
                now.saturating_add(ttl)
            }
        }
    }
}

/// Rejects a priority or expiry outside `0..=MAX_ORDERED_VALUE`.
///
/// Returns an error message if the value is out of range, None if valid.
pub fn check_ordered_range(field: &str, value: i64) -> Option<String> {
    if (0..=MAX_ORDERED_VALUE).contains(&value) {
        None
    } else {
        Some(format!(
            "{} must be between 0 and {}, got {}",
            field, MAX_ORDERED_VALUE, value
        ))
    }
}
