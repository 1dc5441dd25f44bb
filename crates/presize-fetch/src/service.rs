//! The estimation service boundary.

use std::sync::Arc;

use presize_catalog::{CatalogNormalizer, SelectionExpr};
use presize_estimate::SizeEngine;
use presize_types::{EventSink, ResourceInfo, SizeEstimate, Target, TracingSink};

use crate::{FetchError, MetadataSource};

/// Fetches metadata for a locator and estimates its download size.
///
/// Every public estimate call answers with a [`SizeEstimate`]; extraction
/// and parse failures degrade to [`SizeEstimate::unknown`] and are reported
/// to the sink as `fetch_failed`.
#[derive(Debug, Clone)]
pub struct SizeService<S> {
    source: S,
    normalizer: CatalogNormalizer,
    engine: SizeEngine,
    sink: Arc<dyn EventSink>,
}

impl<S: MetadataSource> SizeService<S> {
    /// Creates a service that logs through `tracing`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_sink(source, Arc::new(TracingSink))
    }

    /// Creates a service reporting to the given sink.
    #[must_use]
    pub fn with_sink(source: S, sink: Arc<dyn EventSink>) -> Self {
        Self {
            source,
            normalizer: CatalogNormalizer::new(Arc::clone(&sink)),
            engine: SizeEngine::new(Arc::clone(&sink)),
            sink,
        }
    }

    /// Returns the metadata source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Estimates the size of `locator` for a raw quality token.
    pub async fn estimate(&self, locator: &str, is_audio: bool, quality: &str) -> SizeEstimate {
        match Target::from_parts(is_audio, quality) {
            Ok(target) => self.estimate_target(locator, target).await,
            Err(err) => {
                self.report_failure(locator, &err.to_string());
                SizeEstimate::unknown()
            }
        }
    }

    /// Estimates the size of `locator` for a target.
    pub async fn estimate_target(&self, locator: &str, target: Target) -> SizeEstimate {
        self.inspect(locator, target)
            .await
            .map_or_else(SizeEstimate::unknown, |(_, estimate)| estimate)
    }

    /// Fetches and estimates, keeping the normalized metadata.
    ///
    /// Returns `None` if the metadata could not be obtained; the failure is
    /// reported to the sink.
    pub async fn inspect(
        &self,
        locator: &str,
        target: Target,
    ) -> Option<(ResourceInfo, SizeEstimate)> {
        match self.fetch_info(locator, target).await {
            Ok(info) => {
                let estimate = self.engine.estimate(&info);
                Some((info, estimate))
            }
            Err(err) => {
                self.report_failure(locator, &err.to_string());
                None
            }
        }
    }

    /// Fetches and normalizes metadata for a target.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails or the payload is unusable.
    pub async fn fetch_info(&self, locator: &str, target: Target) -> Result<ResourceInfo, FetchError> {
        let expression = SelectionExpr::for_target(target);
        let raw = self.source.fetch(locator, &expression.to_string()).await?;
        Ok(self.normalizer.normalize_with(&raw, &expression)?)
    }

    fn report_failure(&self, locator: &str, reason: &str) {
        self.sink.record(
            "fetch_failed",
            &[("locator", locator.into()), ("reason", reason.into())],
        );
    }
}
