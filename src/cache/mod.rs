//! Cache Module
//!
//! Provides a bounded in-memory cache with TTL reaping and priority-aware
//! eviction, built on an indexed priority queue.

mod clock;
mod entry;
mod queue;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use queue::{pack_sort_key, IndexedPriorityQueue, QueueEntry};
pub use stats::CacheStats;
pub use store::{EvictCallback, EvictionCache};
