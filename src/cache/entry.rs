//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with priority and expiry.

use std::fmt;

// == Cache Entry ==
/// A stored value together with the fields that decide when it leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Eviction priority; lower values are evicted first within
    /// `0..=u32::MAX`. The queue packs it into 32 bits, so anything outside
    /// that range wraps (a negative priority sorts above every positive one).
    pub priority: i64,
    /// Absolute expiry (Unix seconds), ordered correctly within
    /// `0..=u32::MAX` for the same reason
    pub expiry: i64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, priority: i64, expiry: i64) -> Self {
        Self {
            value,
            priority,
            expiry,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired only once `now` has moved
    /// strictly past its expiry, matching the reap rule.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiry < now
    }

    // == Time To Live ==
    /// Seconds left until expiry as of `now`, or `0` once it has passed.
    pub fn ttl_remaining_at(&self, now: i64) -> u64 {
        u64::try_from(self.expiry.saturating_sub(now)).unwrap_or(0)
    }
}

impl<V: fmt::Debug> fmt::Display for CacheEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value: {:?}, priority: {}, expiry: {}",
            self.value, self.priority, self.expiry
        )
    }
}
