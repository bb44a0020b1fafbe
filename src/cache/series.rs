//! Per-series bounded cache with smallest-key eviction
//!
//! Uses BTreeMap leaves so eviction of the smallest key is a `pop_first`.

use std::collections::{BTreeMap, HashMap};

/// Three-level keyed cache for streaming time-series values.
///
/// Values are addressed by `(active_id, timeframe_s, bucket_ts)`, e.g. one
/// candle per time bucket, per timeframe, per asset. Each
/// `(active_id, timeframe_s)` bucket holds at most `max_size` entries.
///
/// When a full bucket receives a new key, the entry with the *smallest*
/// leaf key is evicted. For timestamp-like keys this usually matches
/// "oldest bucket wins", but the contract is key order, not insertion
/// order or recency: callers rely on the eviction being deterministic and
/// cheap, not on LRU behavior.
#[derive(Debug, Default)]
pub struct SeriesCache<V> {
    buckets: HashMap<u32, HashMap<u32, BTreeMap<i64, V>>>,
}

impl<V> SeriesCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Insert a value, evicting the smallest leaf key if the bucket is full.
    ///
    /// Overwriting an existing leaf never changes the bucket size and is
    /// performed without a bound check. A `max_size` of zero makes this a
    /// no-op so the size invariant holds literally.
    pub fn put(&mut self, active_id: u32, timeframe_s: u32, bucket_ts: i64, value: V, max_size: usize) {
        if max_size == 0 {
            return;
        }

        let bucket = self
            .buckets
            .entry(active_id)
            .or_default()
            .entry(timeframe_s)
            .or_default();

        if !bucket.contains_key(&bucket_ts) && bucket.len() >= max_size {
            bucket.pop_first();
        }
        bucket.insert(bucket_ts, value);
    }

    /// Get a single value
    pub fn get(&self, active_id: u32, timeframe_s: u32, bucket_ts: i64) -> Option<&V> {
        self.bucket(active_id, timeframe_s)?.get(&bucket_ts)
    }

    /// Get the ordered series for one (asset, timeframe) pair
    pub fn bucket(&self, active_id: u32, timeframe_s: u32) -> Option<&BTreeMap<i64, V>> {
        self.buckets.get(&active_id)?.get(&timeframe_s)
    }

    /// Number of entries in one bucket
    pub fn bucket_len(&self, active_id: u32, timeframe_s: u32) -> usize {
        self.bucket(active_id, timeframe_s).map_or(0, BTreeMap::len)
    }

    /// Asset ids currently tracked
    pub fn active_ids(&self) -> Vec<u32> {
        self.buckets.keys().copied().collect()
    }
}
