//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. The configuration stays mutable after construction through
/// [`CacheConfigUpdate`]; changes apply to subsequent inserts and cleanups
/// and never retroactively resize entries already stored.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Byte budget over the sum of all cached payload sizes
    pub max_cache_size: u64,
    /// Age after which a cached entry is considered stale
    pub max_cache_age: Duration,
    /// Re-encoding fidelity in [0, 1] for locally re-processed images,
    /// consumed by the retrieval path
    pub compression_quality: f32,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PAGE_CACHE_MAX_BYTES` - Byte budget (default: 52428800, 50 MiB)
    /// - `PAGE_CACHE_MAX_AGE_SECS` - Entry lifetime in seconds (default: 1800)
    /// - `PAGE_CACHE_COMPRESSION_QUALITY` - Fidelity in [0, 1] (default: 0.8)
    /// - `PAGE_CACHE_CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_cache_size: env::var("PAGE_CACHE_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_cache_size),
            max_cache_age: env::var("PAGE_CACHE_MAX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_cache_age),
            compression_quality: env::var("PAGE_CACHE_COMPRESSION_QUALITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(clamp_quality)
                .unwrap_or(defaults.compression_quality),
            cleanup_interval: env::var("PAGE_CACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Merges the supplied fields into this configuration.
    ///
    /// Absent fields are left untouched. `compression_quality` is clamped
    /// to [0, 1].
    pub fn apply(&mut self, update: CacheConfigUpdate) {
        if let Some(max_cache_size) = update.max_cache_size {
            self.max_cache_size = max_cache_size;
        }
        if let Some(max_cache_age) = update.max_cache_age {
            self.max_cache_age = max_cache_age;
        }
        if let Some(quality) = update.compression_quality {
            self.compression_quality = clamp_quality(quality);
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cache_size: 50 * 1024 * 1024,
            max_cache_age: Duration::from_secs(1800),
            compression_quality: 0.8,
            cleanup_interval: 300,
        }
    }
}

/// Partial configuration update.
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct CacheConfigUpdate {
    /// New byte budget
    pub max_cache_size: Option<u64>,
    /// New entry lifetime
    pub max_cache_age: Option<Duration>,
    /// New re-encoding fidelity in [0, 1]
    pub compression_quality: Option<f32>,
}

fn clamp_quality(quality: f32) -> f32 {
    quality.clamp(0.0, 1.0)
}
