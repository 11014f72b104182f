//! Fetch Module
//!
//! Network retrieval primitive behind an injectable trait, plus the
//! reqwest-backed production implementation.

mod http;

pub use http::{ImageFetcher, ReqwestFetcher};
