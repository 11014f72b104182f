//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU eviction against a
//! byte budget and age-based cleanup.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheReport, CacheStats, ImageEntry, ImageHandle, LruTracker};

// == Cache Store ==
/// Size- and age-bounded store of fetched page images, keyed by URL.
///
/// Mutations never suspend; callers serialize access through a lock, so
/// the byte budget and key uniqueness hold at every observable point.
#[derive(Debug)]
pub struct CacheStore {
    /// URL to entry storage
    entries: HashMap<String, ImageEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Byte budget over the sum of entry sizes
    max_size_bytes: u64,
    /// Entry lifetime in milliseconds
    max_age_ms: u64,
    /// Running sum of entry sizes
    total_size_bytes: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given byte budget and entry
    /// lifetime.
    pub fn new(max_size_bytes: u64, max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_size_bytes,
            max_age_ms: max_age.as_millis() as u64,
            total_size_bytes: 0,
        }
    }

    // == Insert ==
    /// Adds or replaces the entry for `url`, stamped at `now_ms`.
    ///
    /// Least-recently-used entries are evicted first until the new total
    /// fits the byte budget; the incoming entry itself is never an
    /// eviction candidate. A payload larger than the whole budget is kept
    /// alone after everything else has been evicted.
    pub fn insert(&mut self, url: &str, handle: ImageHandle, now_ms: u64) {
        // Replacing an existing key frees its budget before the room check
        if let Some(old) = self.entries.remove(url) {
            self.lru.remove(url);
            self.total_size_bytes -= old.size_bytes;
        }

        let incoming_size = handle.size_bytes();
        while self.total_size_bytes + incoming_size > self.max_size_bytes {
            let Some(victim) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(evicted) = self.entries.remove(&victim) {
                self.total_size_bytes -= evicted.size_bytes;
                self.stats.record_eviction();
                debug!(
                    url = %victim,
                    freed_bytes = evicted.size_bytes,
                    "Evicted least recently used entry"
                );
            }
        }

        if incoming_size > self.max_size_bytes {
            warn!(
                url = %url,
                size_bytes = incoming_size,
                max_size_bytes = self.max_size_bytes,
                "Payload alone exceeds the cache budget; keeping it as the only entry"
            );
        }

        self.entries
            .insert(url.to_string(), ImageEntry::new(handle, now_ms));
        self.lru.touch(url);
        self.total_size_bytes += incoming_size;
    }

    // == Lookup ==
    /// Returns a handle for `url` if cached, recording a hit and marking
    /// the entry most recently used. Records a miss and returns None when
    /// absent; a miss has no other side effect.
    pub fn lookup(&mut self, url: &str, now_ms: u64) -> Option<ImageHandle> {
        match self.entries.get_mut(url) {
            Some(entry) => {
                entry.touch(now_ms);
                self.lru.touch(url);
                self.stats.record_hit();
                Some(entry.handle.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Pure existence check: no hit/miss accounting, no recency touch.
    pub fn peek(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    // == Remove ==
    /// Drops the entry for `url`. No-op when absent.
    pub fn remove(&mut self, url: &str) {
        if let Some(entry) = self.entries.remove(url) {
            self.lru.remove(url);
            self.total_size_bytes -= entry.size_bytes;
        }
    }

    // == Remove Expired ==
    /// Drops every entry older than the configured lifetime at `now_ms`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self, now_ms: u64) -> usize {
        let expired_urls: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.max_age_ms, now_ms))
            .map(|(url, _)| url.clone())
            .collect();

        let count = expired_urls.len();

        for url in expired_urls {
            self.remove(&url);
        }

        count
    }

    // == Clear ==
    /// Drops all entries and resets the hit/miss/eviction counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru = LruTracker::new();
        self.total_size_bytes = 0;
        self.stats.reset();
    }

    // == Set Limits ==
    /// Applies a new byte budget and entry lifetime.
    ///
    /// Takes effect on subsequent inserts and cleanups; entries already
    /// over a lowered budget stay until the next insert evicts them.
    pub fn set_limits(&mut self, max_size_bytes: u64, max_age: Duration) {
        self.max_size_bytes = max_size_bytes;
        self.max_age_ms = max_age.as_millis() as u64;
    }

    // == Total Size ==
    /// Returns the sum of cached payload sizes in bytes.
    pub fn total_size(&self) -> u64 {
        self.total_size_bytes
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Report ==
    /// Builds a statistics snapshot at `now_ms`. Read-only.
    pub fn report(&self, now_ms: u64) -> CacheReport {
        let average_age_ms = if self.entries.is_empty() {
            0
        } else {
            let total_age: u64 = self
                .entries
                .values()
                .map(|entry| entry.age_ms(now_ms))
                .sum();
            total_age / self.entries.len() as u64
        };

        CacheReport {
            total_entries: self.entries.len(),
            total_size_bytes: self.total_size_bytes,
            hit_rate: self.stats.hit_rate(),
            average_age_ms,
            hits: self.stats.hits,
            misses: self.stats.misses,
            evictions: self.stats.evictions,
        }
    }
}
