//! Service Module
//!
//! The public surface consumed by viewer code.
//!
//! # Operations
//! - `get_image` - cache-aware retrieval with request deduplication
//! - `load_progressive` - low-then-high quality two-stage load
//! - `preload_images` - best-effort concurrent warm-up
//! - `is_cached` / `current_cache_size` / `stats` - read-only queries
//! - `cleanup_expired_entries` / `clear_cache` / `update_config` - maintenance

pub mod images;
pub mod progressive;

pub use images::ImageCache;
pub use progressive::{ProgressiveImage, ProgressiveRequest, StageEvent};
