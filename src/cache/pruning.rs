//! Flat keyed cache with a global entry ceiling
//!
//! Guards handler maps that otherwise grow one entry per streamed record
//! (per-option state, per-indicator state). This is a cheap overflow valve,
//! not an LRU: eviction happens one entry at a time, oldest insertion first.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Flat map whose size is held near a configured ceiling.
///
/// `prune` evicts at most one entry per call, and only when the map is
/// strictly above the ceiling. Eviction order is insertion-order FIFO,
/// tracked by an explicit queue; overwriting an existing key keeps its
/// original rank. (Earlier behavior leaned on hash-map iteration order,
/// which is only approximately oldest-first and not a guarantee; the
/// explicit queue makes the policy deterministic.)
#[derive(Debug)]
pub struct PruningMap<K, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V> PruningMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Insert or overwrite a value
    pub fn insert(&mut self, key: K, value: V) {
        if !self.entries.contains_key(&key) {
            self.order.push_back(key.clone());
        }
        self.entries.insert(key, value);
    }

    /// Evict the single oldest-inserted entry if the map is above `ceiling`
    pub fn prune(&mut self, ceiling: usize) {
        if self.entries.len() > ceiling {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }
}

impl<K: Eq + Hash + Clone, V> Default for PruningMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
