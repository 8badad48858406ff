//! Cache Store Module
//!
//! Main cache engine: a key-value table kept in lockstep with two indexed
//! priority queues, one for capacity eviction and one for TTL reaping.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, trace};

use crate::cache::{CacheEntry, CacheStats, Clock, IndexedPriorityQueue, SystemClock};
use crate::error::{CacheError, QueueError, Result};

/// Called with each entry the cache drops on its own.
///
/// Runs on the caller's thread while the cache's write lock is held, so it
/// must not call back into the same cache.
pub type EvictCallback<K, V> = Box<dyn Fn(&K, &CacheEntry<V>) + Send + Sync>;

/// Everything guarded by the cache lock.
struct CacheState<K, V> {
    /// Key-value storage
    table: HashMap<K, CacheEntry<V>>,
    /// Ordered by (priority, last access)
    recency: IndexedPriorityQueue<K>,
    /// Ordered by expiry
    expiry: IndexedPriorityQueue<K>,
    stats: CacheStats,
}

// == Eviction Cache ==
/// Bounded cache with lazy TTL reaping and priority/recency eviction.
///
/// `get`, `set` and `remove` take the write lock since each of them moves an
/// entry in at least one queue; `contains`, `len` and the read-only views
/// take the read lock and look at the table only. An entry past its expiry
/// stays visible until a `set` that needs room reaps it.
pub struct EvictionCache<K, V> {
    capacity: usize,
    state: RwLock<CacheState<K, V>>,
    on_evict: Option<EvictCallback<K, V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> EvictionCache<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        Ok(Self {
            capacity,
            state: RwLock::new(CacheState {
                table: HashMap::with_capacity(capacity),
                recency: IndexedPriorityQueue::new(capacity),
                expiry: IndexedPriorityQueue::new(capacity),
                stats: CacheStats::new(),
            }),
            on_evict: None,
            clock: Arc::new(SystemClock),
        })
    }

    /// Creates a cache that reports every reaped or evicted entry to `on_evict`.
    pub fn with_evict_callback<F>(capacity: usize, on_evict: F) -> Result<Self>
    where
        F: Fn(&K, &CacheEntry<V>) + Send + Sync + 'static,
    {
        let mut cache = Self::new(capacity)?;
        cache.on_evict = Some(Box::new(on_evict));
        Ok(cache)
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // == Get ==
    /// Looks up a key and marks it as just used.
    ///
    /// The entry's recency stamp is refreshed; its priority is unchanged. No
    /// expiry check happens here.
    pub fn get<Q>(&self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let now = self.clock.now();
        let mut guard = self.state.write();
        let state = &mut *guard;

        let Some((owned_key, entry)) = state.table.get_key_value(key) else {
            state.stats.record_miss();
            return None;
        };

        if let Err(err) = requeue(&state.recency, owned_key, entry.priority, now) {
            consistency_fault("recency", err);
        }
        state.stats.record_hit();

        Some(entry.clone())
    }

    // == Set ==
    /// Inserts or overwrites a key.
    ///
    /// When a new key finds the cache full, every entry whose expiry is
    /// strictly before now is reaped first; if that frees nothing, the entry
    /// with the lowest priority (oldest access on ties) is evicted. Returns
    /// whether anything was dropped to make room, which is never the case for
    /// an overwrite.
    pub fn set(&self, key: K, value: V, priority: i64, expiry: i64) -> bool {
        let now = self.clock.now();
        let mut guard = self.state.write();
        let state = &mut *guard;

        if state.table.contains_key(&key) {
            if let Err(err) = requeue(&state.recency, &key, priority, now) {
                consistency_fault("recency", err);
            }
            if let Err(err) = requeue(&state.expiry, &key, expiry, 0) {
                consistency_fault("expiry", err);
            }
            state.table.insert(key, CacheEntry::new(value, priority, expiry));
            return false;
        }

        let mut evicted = false;

        if state.table.len() >= self.capacity {
            let reaped = self.reap_expired(state, now);
            if reaped > 0 {
                debug!(reaped, remaining = state.table.len(), "reaped expired entries");
                evicted = true;
            }
        }

        if state.table.len() >= self.capacity {
            evicted |= self.evict_lowest(state);
        }

        state
            .table
            .insert(key.clone(), CacheEntry::new(value, priority, expiry));
        if let Err(err) = state.recency.push(key.clone(), priority, now) {
            consistency_fault("recency", err);
        }
        if let Err(err) = state.expiry.push(key, expiry, 0) {
            consistency_fault("expiry", err);
        }

        evicted
    }

    // == Remove ==
    /// Drops a key from the cache. The eviction callback is not invoked.
    ///
    /// Returns whether the key was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.state.write();
        let state = &mut *guard;

        if state.table.remove(key).is_none() {
            return false;
        }
        if let Err(err) = state.recency.remove(key) {
            consistency_fault("recency", err);
        }
        if let Err(err) = state.expiry.remove(key) {
            consistency_fault("expiry", err);
        }
        true
    }

    // == Contains ==
    /// Table membership only; an expired entry not yet reaped still counts.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.read().table.contains_key(key)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.state.read().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().table.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current time according to the cache's clock.
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.read();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.table.len());
        stats
    }

    // == Snapshot ==
    /// Copies of every entry, in no particular order.
    pub fn snapshot(&self) -> Vec<(K, CacheEntry<V>)>
    where
        V: Clone,
    {
        self.state
            .read()
            .table
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    /// Pops every expired entry off the expiry queue.
    fn reap_expired(&self, state: &mut CacheState<K, V>, now: i64) -> usize {
        let mut reaped = 0;

        while let Some(expired) = state.expiry.pop_if(|head| head.priority < now) {
            if let Err(err) = state.recency.remove(&expired.key) {
                consistency_fault("recency", err);
            }
            self.purge(state, expired.key);
            state.stats.record_expiration();
            reaped += 1;
        }

        reaped
    }

    /// Evicts the single lowest-priority, least recently used entry.
    fn evict_lowest(&self, state: &mut CacheState<K, V>) -> bool {
        let Ok(victim) = state.recency.pop() else {
            return false;
        };

        trace!(
            priority = victim.priority,
            last_access = victim.timestamp,
            "evicting lowest-priority entry"
        );
        if let Err(err) = state.expiry.remove(&victim.key) {
            consistency_fault("expiry", err);
        }
        self.purge(state, victim.key);
        state.stats.record_eviction();
        true
    }

    /// Removes a key from the table and reports it to the eviction callback.
    fn purge(&self, state: &mut CacheState<K, V>, key: K) {
        match state.table.remove(&key) {
            Some(entry) => {
                if let Some(on_evict) = &self.on_evict {
                    on_evict(&key, &entry);
                }
            }
            None => consistency_fault("table", QueueError::NoSuchKey),
        }
    }

    /// Checks that the table and both queues hold the same keys and that
    /// both heaps are well formed.
    #[cfg(test)]
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        use std::collections::HashSet;

        let state = self.state.read();
        state.recency.validate()?;
        state.expiry.validate()?;

        let table: HashSet<K> = state.table.keys().cloned().collect();
        let recency: HashSet<K> = state.recency.keys().into_iter().collect();
        let expiry: HashSet<K> = state.expiry.keys().into_iter().collect();

        if table != recency || table != expiry {
            return Err(format!(
                "key sets diverged: table {}, recency {}, expiry {}",
                table.len(),
                recency.len(),
                expiry.len()
            ));
        }
        if table.len() > self.capacity {
            return Err(format!("{} entries over capacity {}", table.len(), self.capacity));
        }

        Ok(())
    }
}

impl<K, V> EvictionCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: fmt::Debug,
{
    // == Dump ==
    /// Human-readable listing, one entry per line, in no particular order.
    pub fn dump(&self) -> String {
        let state = self.state.read();
        state
            .table
            .iter()
            .map(|(key, entry)| format!("key: {:?}, {}", key, entry))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<K, V> fmt::Display for EvictionCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

impl<K, V> fmt::Debug for EvictionCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionCache")
            .field("capacity", &self.capacity)
            .field("len", &self.state.read().table.len())
            .field("has_evict_callback", &self.on_evict.is_some())
            .field("clock", &self.clock)
            .finish()
    }
}

/// Moves a queued key to a new position by removing and re-pushing it.
fn requeue<K>(
    queue: &IndexedPriorityQueue<K>,
    key: &K,
    priority: i64,
    timestamp: i64,
) -> std::result::Result<(), QueueError>
where
    K: Eq + Hash + Clone,
{
    queue.remove(key)?;
    queue.push(key.clone(), priority, timestamp)
}

fn consistency_fault(structure: &'static str, err: QueueError) {
    error!(structure, %err, "cache structures out of sync");
}
