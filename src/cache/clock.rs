//! Clock Module
//!
//! Time source for recency stamps and expiry checks, in unix seconds.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

/// Supplies "now" to the cache.
pub trait Clock: Send + Sync + Debug {
    /// Current unix time in seconds.
    fn now(&self) -> i64;
}

// == System Clock ==
/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        current_timestamp()
    }
}

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Useful for tests and for embedders that drive time themselves.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward by `secs` and returns the new time.
    pub fn advance(&self, secs: i64) -> i64 {
        self.now.fetch_add(secs, Ordering::SeqCst) + secs
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_tracks_wall_time() {
        let before = current_timestamp();
        let now = SystemClock.now();
        assert!(now >= before);
        assert!(now - before <= 1);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        assert_eq!(clock.advance(5), 105);
        assert_eq!(clock.now(), 105);
        clock.set(42);
        assert_eq!(clock.now(), 42);
    }
}
