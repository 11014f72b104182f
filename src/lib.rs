//! Page Image Cache - a client-resident cache of fetched page images
//!
//! Keeps previously retrieved page images in memory across navigation,
//! bounded by a byte budget (LRU eviction) and an entry lifetime, with
//! deduplicated retrieval and progressive low-then-high quality loading.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod service;
pub mod tasks;

pub use config::{CacheConfig, CacheConfigUpdate};
pub use error::FetchError;
pub use service::{ImageCache, ProgressiveImage, ProgressiveRequest, StageEvent};
pub use tasks::spawn_cleanup_task;
