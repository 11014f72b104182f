//! Image Cache Service
//!
//! Cache-aware image retrieval with in-flight request deduplication, plus
//! the maintenance surface consumed by viewer code.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cache::{current_timestamp_ms, CacheReport, CacheStore, ImageHandle};
use crate::config::{CacheConfig, CacheConfigUpdate};
use crate::error::{FetchError, Result};
use crate::fetch::{ImageFetcher, ReqwestFetcher};

/// Settled result of one underlying retrieval, shared with every caller
/// coalesced onto it.
type FetchOutcome = std::result::Result<ImageHandle, FetchError>;

// == Image Cache ==
/// Client-resident cache of fetched page images.
///
/// The application constructs one `ImageCache` for its session and clones
/// it wherever a handle is needed; clones share the same store, statistics
/// and in-flight retrievals.
#[derive(Clone)]
pub struct ImageCache {
    /// Shared store of cached entries
    store: Arc<RwLock<CacheStore>>,
    /// Live configuration, mutable at runtime
    config: Arc<RwLock<CacheConfig>>,
    /// Pending retrievals keyed by URL; present only between retrieval
    /// start and settlement
    in_flight: Arc<Mutex<HashMap<String, broadcast::Sender<FetchOutcome>>>>,
    /// Network retrieval primitive
    fetcher: Arc<dyn ImageFetcher>,
}

impl ImageCache {
    // == Constructors ==
    /// Creates a cache with the given configuration and the reqwest-backed
    /// fetcher.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let fetcher = ReqwestFetcher::new()?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Creates a cache with configuration loaded from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(CacheConfig::from_env())
    }

    /// Creates a cache over a caller-supplied retrieval primitive.
    pub fn with_fetcher(config: CacheConfig, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let store = CacheStore::new(config.max_cache_size, config.max_cache_age);
        Self {
            store: Arc::new(RwLock::new(store)),
            config: Arc::new(RwLock::new(config)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            fetcher,
        }
    }

    // == Get Image ==
    /// Returns the image at `url`, from cache when possible.
    ///
    /// On a hit the stored handle is returned without touching the
    /// network. On a miss, concurrent callers for the same URL share one
    /// underlying retrieval; the first caller fetches, inserts on success
    /// and settles everyone with the same handle or the same error.
    /// Failures are never cached, so a later call retries.
    pub async fn get_image(&self, url: &str) -> Result<ImageHandle> {
        // Join an in-flight retrieval for this URL, or register as its
        // leader. Registration happens under the store lock: a leader
        // inserts before it settles, so a miss observed here guarantees
        // the in-flight entry for that retrieval is still present.
        let receiver = {
            let mut store = self.store.write().await;
            if let Some(handle) = store.lookup(url, current_timestamp_ms()) {
                debug!(url = %url, "Cache hit");
                return Ok(handle);
            }

            let mut in_flight = self.in_flight.lock().unwrap();
            match in_flight.get(url) {
                Some(sender) => Some(sender.subscribe()),
                None => {
                    let (sender, _) = broadcast::channel(1);
                    in_flight.insert(url.to_string(), sender);
                    None
                }
            }
        };

        if let Some(mut rx) = receiver {
            debug!(url = %url, "Joining in-flight retrieval");
            return match rx.recv().await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Network(
                    "Image retrieval was interrupted".to_string(),
                )),
            };
        }

        let outcome = self.fetch_and_store(url).await;

        // Settle: drop the in-flight entry first so late callers retry or
        // hit the cache, then wake the coalesced followers
        let sender = self.in_flight.lock().unwrap().remove(url);
        if let Some(sender) = sender {
            let _ = sender.send(outcome.clone());
        }

        outcome
    }

    /// Leader path of a miss: fetch, wrap, insert.
    async fn fetch_and_store(&self, url: &str) -> FetchOutcome {
        let compression_quality = self.config.read().await.compression_quality;

        match self.fetcher.fetch(url).await {
            Ok(bytes) => {
                let handle = ImageHandle::new(bytes);
                let mut store = self.store.write().await;
                store.insert(url, handle.clone(), current_timestamp_ms());
                debug!(
                    url = %url,
                    size_bytes = handle.size_bytes(),
                    compression_quality,
                    "Image cached"
                );
                Ok(handle)
            }
            Err(err) => {
                warn!(url = %url, error = %err, "Image retrieval failed");
                Err(err)
            }
        }
    }

    // == Is Cached ==
    /// Pure existence check; counts neither a hit nor a miss and leaves
    /// recency untouched.
    pub async fn is_cached(&self, url: &str) -> bool {
        self.store.read().await.peek(url)
    }

    // == Preload ==
    /// Fetches every URL concurrently, caching what succeeds.
    ///
    /// Individual failures are logged and discarded so one bad resource
    /// never blocks the rest; the call itself always completes. Returns
    /// the number of URLs that ended up cached.
    pub async fn preload_images(&self, urls: &[String]) -> usize {
        let mut tasks = JoinSet::new();

        for url in urls {
            let cache = self.clone();
            let url = url.clone();
            tasks.spawn(async move {
                match cache.get_image(&url).await {
                    Ok(_) => true,
                    Err(err) => {
                        debug!(url = %url, error = %err, "Preload skipped failing URL");
                        false
                    }
                }
            });
        }

        let mut cached = 0;
        while let Some(joined) = tasks.join_next().await {
            if matches!(joined, Ok(true)) {
                cached += 1;
            }
        }
        cached
    }

    // == Cleanup ==
    /// Removes entries older than the configured lifetime.
    ///
    /// Not run implicitly by other operations; the viewer calls this
    /// directly or through [`crate::tasks::spawn_cleanup_task`]. Returns
    /// the number of entries removed.
    pub async fn cleanup_expired_entries(&self) -> usize {
        let removed = self
            .store
            .write()
            .await
            .remove_expired(current_timestamp_ms());
        if removed > 0 {
            info!(removed, "Removed expired cache entries");
        }
        removed
    }

    // == Clear ==
    /// Drops every entry and resets the hit/miss/eviction counters.
    pub async fn clear_cache(&self) {
        self.store.write().await.clear();
        info!("Cache cleared");
    }

    // == Size ==
    /// Returns the sum of cached payload sizes in bytes.
    pub async fn current_cache_size(&self) -> u64 {
        self.store.read().await.total_size()
    }

    // == Stats ==
    /// Builds a point-in-time statistics snapshot. Never mutates the
    /// store.
    pub async fn stats(&self) -> CacheReport {
        self.store.read().await.report(current_timestamp_ms())
    }

    // == Configuration ==
    /// Returns a copy of the live configuration.
    pub async fn config(&self) -> CacheConfig {
        self.config.read().await.clone()
    }

    /// Merges the supplied fields into the live configuration.
    ///
    /// New limits apply to subsequent inserts and cleanups; a lowered
    /// byte budget is enforced lazily by the next insert, never by the
    /// update itself.
    pub async fn update_config(&self, update: CacheConfigUpdate) {
        let mut config = self.config.write().await;
        config.apply(update);
        self.store
            .write()
            .await
            .set_limits(config.max_cache_size, config.max_cache_age);
        debug!(
            max_cache_size = config.max_cache_size,
            max_cache_age_secs = config.max_cache_age.as_secs(),
            compression_quality = config.compression_quality,
            "Configuration updated"
        );
    }
}
