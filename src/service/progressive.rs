//! Progressive Loading Module
//!
//! Two-stage image loading: a lower-fidelity variant first for fast
//! display, then the full-fidelity variant. The caller observes each
//! stage through a typed event.

use crate::cache::ImageHandle;
use crate::error::{FetchError, Result};
use crate::service::ImageCache;

// == Progressive Request ==
/// Inputs for a two-stage load.
#[derive(Debug, Clone)]
pub struct ProgressiveRequest {
    /// Optional lower-fidelity variant, loaded first when present
    pub low_quality_url: Option<String>,
    /// Full-fidelity variant
    pub high_quality_url: String,
}

impl ProgressiveRequest {
    /// Builds a request for the full-fidelity variant only.
    pub fn new(high_quality_url: impl Into<String>) -> Self {
        Self {
            low_quality_url: None,
            high_quality_url: high_quality_url.into(),
        }
    }

    /// Builds a request that loads a preview before the full variant.
    pub fn with_preview(
        low_quality_url: impl Into<String>,
        high_quality_url: impl Into<String>,
    ) -> Self {
        Self {
            low_quality_url: Some(low_quality_url.into()),
            high_quality_url: high_quality_url.into(),
        }
    }
}

// == Stage Event ==
/// Per-stage outcome delivered to the caller's observer as the load
/// progresses.
#[derive(Debug, Clone)]
pub enum StageEvent {
    /// The low-quality variant is available
    LowQualityLoaded(ImageHandle),
    /// The high-quality variant is available
    HighQualityLoaded(ImageHandle),
    /// A stage failed; emitted before the error is returned
    Failed(FetchError),
}

// == Progressive Image ==
/// Handles produced by a successful progressive load.
#[derive(Debug, Clone)]
pub struct ProgressiveImage {
    /// Present only when the request named a low-quality variant
    pub low_quality: Option<ImageHandle>,
    /// The full-fidelity handle
    pub high_quality: ImageHandle,
}

impl ImageCache {
    // == Load Progressive ==
    /// Loads an image in up to two stages through the cache.
    ///
    /// The low-quality stage, when requested, settles (success or
    /// failure) strictly before the high-quality stage begins. Each stage
    /// outcome is reported to `on_stage`; a failure at either stage emits
    /// [`StageEvent::Failed`] and aborts the load with that error. There
    /// is no mid-flight cancellation.
    pub async fn load_progressive<F>(
        &self,
        request: ProgressiveRequest,
        mut on_stage: F,
    ) -> Result<ProgressiveImage>
    where
        F: FnMut(StageEvent),
    {
        let low_quality = match &request.low_quality_url {
            Some(url) => match self.get_image(url).await {
                Ok(handle) => {
                    on_stage(StageEvent::LowQualityLoaded(handle.clone()));
                    Some(handle)
                }
                Err(err) => {
                    on_stage(StageEvent::Failed(err.clone()));
                    return Err(err);
                }
            },
            None => None,
        };

        match self.get_image(&request.high_quality_url).await {
            Ok(handle) => {
                on_stage(StageEvent::HighQualityLoaded(handle.clone()));
                Ok(ProgressiveImage {
                    low_quality,
                    high_quality: handle,
                })
            }
            Err(err) => {
                on_stage(StageEvent::Failed(err.clone()));
                Err(err)
            }
        }
    }
}
