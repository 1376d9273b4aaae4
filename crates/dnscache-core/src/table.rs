//! Separate-chaining hash table keyed by record name.
//!
//! Each bucket owns a `Vec` of entries. Inserts never check for an existing
//! key: a repeated name adds a second entry, and the newest entry is the one
//! `get` and `delete` see first. Older duplicates stay reachable through
//! `iter()` until they are deleted in turn.
//!
//! Capacity is fixed unless a max load factor is set, in which case the table
//! doubles its bucket count before an insert would cross the threshold.
//!
//! The table has no interior locking. Mutation needs `&mut self`, so it cannot
//! be shared across threads for writing without external synchronisation.

use hashbrown::HashSet;
use tracing::debug;

use crate::config::{Config, MAX_CAPACITY};
use crate::error::{StoreError, StoreResult};

/// Multiplier of the polynomial rolling hash
pub const HASH_MULTIPLIER: u64 = 31;

/// Bucket index for `key` in a table of `capacity` buckets.
///
/// `hash = (hash * 31 + codepoint) % capacity` for every char, reducing at each
/// step so the accumulator never exceeds `capacity * 31 + 0x10FFFF`.
/// A `capacity` of zero is treated as one bucket.
pub fn bucket_hash(key: &str, capacity: usize) -> usize {
    let capacity = capacity.max(1) as u64;
    key.chars()
        .fold(0u64, |hash, c| (hash * HASH_MULTIPLIER + u64::from(c)) % capacity) as usize
}

/// Next capacity when growing, saturating at `MAX_CAPACITY`.
fn doubled(capacity: usize) -> usize {
    capacity.saturating_mul(2).min(MAX_CAPACITY)
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: String,
}

/// Chain storage order is oldest-first; the logical chain order (newest
/// first) is the reverse of the vector.
type Chain = Vec<Entry>;

/// Hash table with separate chaining and duplicate-preserving inserts.
#[derive(Debug, Clone)]
pub struct ChainedHashTable {
    buckets: Vec<Chain>,
    /// Total entries across all chains, duplicates included
    len: usize,
    max_load_factor: Option<f64>,
}

impl ChainedHashTable {
    /// Create an empty fixed-capacity table.
    ///
    /// A capacity of zero is raised to one bucket and anything above
    /// `MAX_CAPACITY` is clamped.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_CAPACITY);
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, Chain::new);
        Self { buckets, len: 0, max_load_factor: None }
    }

    /// Build a table from a validated configuration.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        config.validate().map_err(|reason| StoreError::InvalidConfig { reason })?;
        let table = Self::new(config.capacity);
        Ok(match config.max_load_factor {
            Some(lf) => table.with_max_load_factor(lf),
            None => table,
        })
    }

    /// Enable automatic doubling once `len / capacity` would exceed `lf`.
    ///
    /// `lf` must be positive and finite; anything else leaves the capacity
    /// fixed, as `Config::validate` would have rejected it.
    pub fn with_max_load_factor(mut self, lf: f64) -> Self {
        self.max_load_factor = (lf.is_finite() && lf > 0.0).then_some(lf);
        self
    }

    /// Prepend `key -> value` to its bucket. Always succeeds.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if let Some(lf) = self.max_load_factor {
            let projected = (self.len + 1) as f64 / self.capacity() as f64;
            if projected > lf && self.capacity() < MAX_CAPACITY {
                self.resize(doubled(self.capacity()));
            }
        }

        let key = key.into();
        let idx = self.bucket_of(&key);
        self.buckets[idx].push(Entry { key, value: value.into() });
        self.len += 1;
    }

    /// True if any entry carries `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.buckets[self.bucket_of(key)].iter().any(|e| e.key == key)
    }

    /// Value of the most recently inserted entry for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.buckets[self.bucket_of(key)]
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Remove the most recently inserted entry for `key` and return its value.
    ///
    /// Older duplicates are left in place, so a following `get` surfaces the
    /// previous value. Absent keys are a no-op.
    pub fn delete(&mut self, key: &str) -> Option<String> {
        let idx = self.bucket_of(key);
        let chain = &mut self.buckets[idx];
        let pos = chain.iter().rposition(|e| e.key == key)?;
        let entry = chain.remove(pos);
        self.len -= 1;
        Some(entry.value)
    }

    /// Iterate `(key, value)` pairs bucket by bucket, newest first within
    /// each chain. Every call starts a fresh pass.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: self.buckets.iter(),
            chain: <&[Entry]>::default().iter().rev(),
            remaining: self.len,
        }
    }

    /// Rehash every entry into `new_capacity` buckets (clamped like `new`).
    ///
    /// Entries with the same key always land in the same bucket, and are
    /// moved oldest first, so their relative recency survives the move.
    pub fn resize(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.clamp(1, MAX_CAPACITY);
        let old_capacity = self.capacity();
        if new_capacity == old_capacity {
            return;
        }

        let mut buckets = Vec::with_capacity(new_capacity);
        buckets.resize_with(new_capacity, Chain::new);

        for chain in self.buckets.drain(..) {
            for entry in chain {
                let idx = bucket_hash(&entry.key, new_capacity);
                buckets[idx].push(entry);
            }
        }

        debug!(
            from = old_capacity,
            to = new_capacity,
            entries = self.len,
            "rehashed table"
        );
        self.buckets = buckets;
    }

    /// Drop every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.len = 0;
    }

    /// Bucket index `key` hashes to under the current capacity.
    pub fn bucket_of(&self, key: &str) -> usize {
        bucket_hash(key, self.capacity())
    }

    /// Total entries, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Configured resize threshold, if any.
    pub fn max_load_factor(&self) -> Option<f64> {
        self.max_load_factor
    }

    /// `len / capacity`.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Number of entries in bucket `idx`, or zero past the end.
    pub fn chain_len(&self, idx: usize) -> usize {
        self.buckets.get(idx).map_or(0, Vec::len)
    }

    /// Length of the longest chain.
    pub fn longest_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Number of unique keys, ignoring duplicates.
    pub fn distinct_keys(&self) -> usize {
        self.iter().map(|(k, _)| k).collect::<HashSet<_>>().len()
    }
}

impl Default for ChainedHashTable {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CAPACITY)
    }
}

/// Iterator returned by [`ChainedHashTable::iter`].
pub struct Iter<'a> {
    buckets: std::slice::Iter<'a, Chain>,
    chain: std::iter::Rev<std::slice::Iter<'a, Entry>>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.next() {
                self.remaining -= 1;
                return Some((entry.key.as_str(), entry.value.as_str()));
            }
            self.chain = self.buckets.next()?.iter().rev();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a ChainedHashTable {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
