//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the viewer is
//! open.
//!
//! # Tasks
//! - Expiry cleanup: removes stale cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
