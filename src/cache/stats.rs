//! Cache Statistics Module
//!
//! Tracks hit/miss/eviction counters and builds reporting snapshots.

use serde::Serialize;

// == Cache Stats ==
/// Cumulative cache counters.
///
/// Counters run from cache construction and are reset by a clear.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of lookups that found a live entry
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of entries evicted to satisfy the byte budget
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have occurred.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Cache Report ==
/// Point-in-time statistics snapshot derived from store state.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    /// Current number of cached entries
    pub total_entries: usize,
    /// Sum of cached payload sizes in bytes
    pub total_size_bytes: u64,
    /// Hits / (hits + misses); 0.0 before the first lookup
    pub hit_rate: f64,
    /// Mean entry age in milliseconds; 0 when the cache is empty
    pub average_age_ms: u64,
    /// Cumulative hit count
    pub hits: u64,
    /// Cumulative miss count
    pub misses: u64,
    /// Cumulative eviction count
    pub evictions: u64,
}
