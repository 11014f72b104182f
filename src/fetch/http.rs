//! HTTP retrieval primitive
//!
//! Abstracts the network fetch behind a trait so the cache can be driven
//! by a fake client in tests.

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::{FetchError, Result};

// == Image Fetcher Trait ==
/// Network retrieval seam used by the cache on a miss.
///
/// Implementations must produce exactly the two failure classes of
/// [`FetchError`]: `Http` when a response arrived with a non-OK status,
/// `Network` when no response was received at all.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Retrieves the raw binary payload at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// == Reqwest Fetcher ==
/// Production fetcher backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    // == Constructor ==
    /// Creates a fetcher with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a fetcher with a custom request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        trace!(url = %url, "Requesting image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            return Err(FetchError::Http(reason));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        debug!(url = %url, size_bytes = body.len(), "Image retrieved");
        Ok(body.to_vec())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_construction() {
        assert!(ReqwestFetcher::new().is_ok());
        assert!(ReqwestFetcher::with_timeout(5).is_ok());
    }
}
