//! Cache Entry Module
//!
//! Defines the in-memory image handle and per-entry metadata.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// == Image Handle ==
/// Shared reference to an immutable in-memory image payload.
///
/// Cloning is cheap (reference counted). A handle already returned to a
/// caller keeps the payload alive after the entry is evicted; the bytes
/// are released once the last handle is dropped.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    bytes: Arc<[u8]>,
}

impl ImageHandle {
    // == Constructor ==
    /// Wraps a fetched payload in a shareable handle.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the raw image bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the payload size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// == Cache Entry ==
/// A cached image together with its bookkeeping metadata.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    /// The owned payload handle
    pub handle: ImageHandle,
    /// Payload size in bytes
    pub size_bytes: u64,
    /// Insertion timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Timestamp of the most recent hit (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Number of hits since insertion
    pub access_count: u64,
}

impl ImageEntry {
    // == Constructor ==
    /// Creates a new entry stamped at `now_ms` with a zero access count.
    pub fn new(handle: ImageHandle, now_ms: u64) -> Self {
        let size_bytes = handle.size_bytes();
        Self {
            handle,
            size_bytes,
            created_at: now_ms,
            last_accessed_at: now_ms,
            access_count: 0,
        }
    }

    // == Touch ==
    /// Records a hit: bumps the access count and moves `last_accessed_at`
    /// forward. `last_accessed_at` never precedes `created_at`.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_accessed_at = now_ms.max(self.created_at);
        self.access_count += 1;
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `max_age_ms` at `now_ms`.
    ///
    /// Boundary condition: an entry exactly `max_age_ms` old is still
    /// live; expiry requires the age to exceed the limit.
    pub fn is_expired(&self, max_age_ms: u64, now_ms: u64) -> bool {
        self.age_ms(now_ms) > max_age_ms
    }

    // == Age ==
    /// Returns the entry age in milliseconds at `now_ms`.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
