//! Prio Cache - A bounded in-memory cache with TTL reaping and priority eviction
//!
//! The core is [`cache::EvictionCache`], a thread-safe key-value table kept in
//! lockstep with two [`cache::IndexedPriorityQueue`]s: one ordered by
//! (priority, last access) for capacity eviction, one ordered by expiry for
//! reaping. The `api` module serves a string cache over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheEntry, EvictionCache, IndexedPriorityQueue};
pub use config::Config;
pub use error::{CacheError, QueueError};
