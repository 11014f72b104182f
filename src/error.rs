//! Error types for image retrieval
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Fetch Error Enum ==
/// Classification of image retrieval failures.
///
/// `Clone` is derived so a single failed retrieval can be shared with
/// every caller coalesced onto the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// A response was received but indicates failure (non-OK status)
    #[error("Failed to fetch image: {0}")]
    Http(String),

    /// The retrieval never produced a response (DNS, connection or
    /// timeout class failures); carries the transport cause verbatim
    #[error("{0}")]
    Network(String),
}

// == Result Type Alias ==
/// Convenience Result type for retrieval operations.
pub type Result<T> = std::result::Result<T, FetchError>;
