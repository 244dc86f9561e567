//! Approximate membership test for archive deduplication.
//!
//! A run may see the same conversation many times (listings shift while they
//! are paged through). The filter remembers every key archived during the run
//! in bounded memory. It can answer "seen" for a key that was never added, with
//! probability bounded by the configured error rate, but never answers "unseen"
//! for a key that was added.

use std::fmt;

use fastbloom::BloomFilter;

/// Set-membership contract used by [`ArchiveWriter`](super::ArchiveWriter).
///
/// `test` followed by `add` is not atomic. Callers sharing a filter across
/// tasks must hold one lock around both.
pub trait DedupFilter {
    /// Whether `key` may have been added. Never false for an added key.
    fn test(&self, key: &str) -> bool;

    /// Record `key` as seen.
    fn add(&mut self, key: &str);
}

/// Bloom filter sized from an expected population and a target error rate.
pub struct BloomDedup {
    bloom: BloomFilter,
    capacity: usize,
    error_rate: f64,
    added: usize,
}

impl BloomDedup {
    /// Create a filter for up to `capacity` keys at `error_rate` false positives.
    ///
    /// `error_rate` is clamped into (0, 1); a zero capacity is treated as one.
    pub fn new(capacity: usize, error_rate: f64) -> Self {
        let error_rate = error_rate.clamp(1e-9, 0.999_999);
        let capacity = capacity.max(1);
        Self {
            bloom: BloomFilter::with_false_pos(error_rate).expected_items(capacity),
            capacity,
            error_rate,
            added: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Number of `add` calls so far (duplicates included).
    pub fn added(&self) -> usize {
        self.added
    }

    /// Past the design population the error bound no longer holds.
    pub fn is_saturated(&self) -> bool {
        self.added > self.capacity
    }
}

impl DedupFilter for BloomDedup {
    fn test(&self, key: &str) -> bool {
        self.bloom.contains(key)
    }

    fn add(&mut self, key: &str) {
        self.bloom.insert(key);
        self.added += 1;
        if self.added == self.capacity + 1 {
            log::warn!(
                "Dedup filter exceeded its capacity of {} keys; false positive rate will rise above {}",
                self.capacity,
                self.error_rate
            );
        }
    }
}

impl fmt::Debug for BloomDedup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomDedup")
            .field("capacity", &self.capacity)
            .field("error_rate", &self.error_rate)
            .field("added", &self.added)
            .finish()
    }
}
