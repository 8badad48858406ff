//! Indexed Priority Queue Module
//!
//! Fixed-capacity binary min-heap with a key → slot index, so any entry can be
//! removed by key in O(log n) rather than only the root.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::error::QueueError;

// == Sort Key ==
/// Packs `priority` into the high 32 bits and `timestamp` into the low 32 bits.
///
/// One unsigned comparison then orders by priority first and timestamp second.
/// Both halves are truncated to 32 bits, so values outside that range alias.
pub fn pack_sort_key(priority: i64, timestamp: i64) -> u64 {
    (((priority as u64) & 0xffff_ffff) << 32) | ((timestamp as u64) & 0xffff_ffff)
}

// == Queue Entry ==
/// A single heap slot: the key plus the two fields it is ordered by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry<K> {
    /// Key owned by this slot
    pub key: K,
    /// Primary ordering field
    pub priority: i64,
    /// Secondary ordering field
    pub timestamp: i64,
    sort_key: u64,
}

impl<K> QueueEntry<K> {
    /// Creates an entry and computes its packed sort key.
    pub fn new(key: K, priority: i64, timestamp: i64) -> Self {
        Self {
            key,
            priority,
            timestamp,
            sort_key: pack_sort_key(priority, timestamp),
        }
    }

    /// The packed `(priority, timestamp)` value the heap compares.
    pub fn sort_key(&self) -> u64 {
        self.sort_key
    }
}

impl<K: fmt::Debug> fmt::Display for QueueEntry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k: {:?}, p: {}, ts: {}", self.key, self.priority, self.timestamp)
    }
}

// == Heap State ==
/// Dense heap array plus the key → position index that mirrors it.
#[derive(Debug)]
struct HeapState<K> {
    entries: Vec<QueueEntry<K>>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash> HeapState<K> {
    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        if let Some(slot) = self.index.get_mut(&self.entries[a].key) {
            *slot = a;
        }
        if let Some(slot) = self.index.get_mut(&self.entries[b].key) {
            *slot = b;
        }
    }

    /// Removes the slot at `pos`, moving the last entry into its place.
    fn take(&mut self, pos: usize) -> QueueEntry<K> {
        let removed = self.entries.swap_remove(pos);
        self.index.remove(&removed.key);

        if pos < self.entries.len() {
            if let Some(slot) = self.index.get_mut(&self.entries[pos].key) {
                *slot = pos;
            }
            self.restore(pos);
        }

        removed
    }

    /// Re-establishes heap order around a slot whose entry was replaced.
    fn restore(&mut self, pos: usize) {
        if pos > 0 && self.entries[pos].sort_key < self.entries[parent(pos)].sort_key {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = parent(i);
            if self.entries[p].sort_key <= self.entries[i].sort_key {
                break;
            }
            self.swap(p, i);
            i = p;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.entries.len();
        loop {
            let left = left(i);
            let right = right(i);

            let mut min = i;
            if left < len && self.entries[left].sort_key <= self.entries[i].sort_key {
                min = left;
            }
            if right < len && self.entries[right].sort_key <= self.entries[min].sort_key {
                min = right;
            }

            if min == i {
                break;
            }
            self.swap(i, min);
            i = min;
        }
    }
}

fn parent(i: usize) -> usize {
    (i - 1) / 2
}

fn left(i: usize) -> usize {
    i * 2 + 1
}

fn right(i: usize) -> usize {
    i * 2 + 2
}

// == Indexed Priority Queue ==
/// Capacity-bounded min-heap over `(key, priority, timestamp)` triples.
///
/// The queue owns its own readers-writer lock so it is safe to share on its
/// own; reads (`peek`, `len`, `contains`) take the shared side.
#[derive(Debug)]
pub struct IndexedPriorityQueue<K> {
    capacity: usize,
    state: RwLock<HeapState<K>>,
}

impl<K: Eq + Hash + Clone> IndexedPriorityQueue<K> {
    // == Constructor ==
    /// Creates an empty queue with all `capacity` slots reserved up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: RwLock::new(HeapState {
                entries: Vec::with_capacity(capacity),
                index: HashMap::with_capacity(capacity),
            }),
        }
    }

    // == Push ==
    /// Inserts a key and sifts it into place.
    ///
    /// Fails with `NoFreeSlots` when every slot is taken and with
    /// `DuplicateKey` when the key is already queued; callers re-position a
    /// key by removing it first.
    pub fn push(&self, key: K, priority: i64, timestamp: i64) -> Result<(), QueueError> {
        let mut state = self.state.write();

        if state.entries.len() >= self.capacity {
            return Err(QueueError::NoFreeSlots);
        }
        if state.index.contains_key(&key) {
            return Err(QueueError::DuplicateKey);
        }

        let pos = state.entries.len();
        state.index.insert(key.clone(), pos);
        state.entries.push(QueueEntry::new(key, priority, timestamp));
        state.sift_up(pos);

        Ok(())
    }

    // == Pop ==
    /// Removes and returns the entry with the smallest sort key.
    pub fn pop(&self) -> Result<QueueEntry<K>, QueueError> {
        let mut state = self.state.write();

        if state.entries.is_empty() {
            return Err(QueueError::EmptyQueue);
        }
        Ok(state.take(0))
    }

    // == Pop If ==
    /// Pops the minimum only when `pred` accepts it; the check and the pop
    /// happen under one lock acquisition.
    pub fn pop_if<F>(&self, pred: F) -> Option<QueueEntry<K>>
    where
        F: FnOnce(&QueueEntry<K>) -> bool,
    {
        let mut state = self.state.write();

        let accepted = state.entries.first().map_or(false, pred);
        if accepted {
            Some(state.take(0))
        } else {
            None
        }
    }

    // == Peek ==
    /// Returns a copy of the minimum entry without removing it.
    pub fn peek(&self) -> Result<QueueEntry<K>, QueueError> {
        self.state
            .read()
            .entries
            .first()
            .cloned()
            .ok_or(QueueError::EmptyQueue)
    }

    // == Remove ==
    /// Removes an arbitrary entry by key and returns it.
    ///
    /// The last entry is moved into the vacated slot and then sifted up or
    /// down, whichever its new neighbours require.
    pub fn remove<Q>(&self, key: &Q) -> Result<QueueEntry<K>, QueueError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.write();

        if state.entries.is_empty() {
            return Err(QueueError::EmptyQueue);
        }
        let pos = *state.index.get(key).ok_or(QueueError::NoSuchKey)?;

        Ok(state.take(pos))
    }

    // == Contains ==
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.read().index.contains_key(key)
    }

    // == Keys ==
    /// Keys currently queued, in heap array order.
    pub fn keys(&self) -> Vec<K> {
        self.state
            .read()
            .entries
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    // == Capacity ==
    /// Number of slots fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Checks the heap order and the index/array agreement.
    #[cfg(test)]
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let state = self.state.read();
        let entries = &state.entries;

        if state.index.len() != entries.len() {
            return Err(format!(
                "index holds {} keys, array holds {}",
                state.index.len(),
                entries.len()
            ));
        }

        for (i, entry) in entries.iter().enumerate() {
            if state.index.get(&entry.key) != Some(&i) {
                return Err(format!("index disagrees with array at slot {}", i));
            }
            for child in [left(i), right(i)] {
                if child < entries.len() && entries[i].sort_key > entries[child].sort_key {
                    return Err(format!("heap order broken between {} and {}", i, child));
                }
            }
        }

        Ok(())
    }
}

impl<K: fmt::Debug> fmt::Display for IndexedPriorityQueue<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        for (i, entry) in state.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}
