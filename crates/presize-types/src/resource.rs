//! Resource metadata as consumed by the size engine.

use serde::{Deserialize, Serialize};

use crate::FormatDescriptor;

/// Normalized metadata for one resource.
///
/// `requested_formats` holds the components chosen by the selection
/// expression. A `None` entry is a component the source failed to describe.
/// When the selection resolved to a single muxed stream there are no
/// components and the top-level size fields describe that stream instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Source-side identifier of the resource.
    pub id: Option<String>,
    /// Human-readable title.
    pub title: Option<String>,
    /// Duration in seconds.
    pub duration_seconds: Option<f64>,
    /// Every format offered for the resource, in source order.
    pub formats: Vec<FormatDescriptor>,
    /// Components selected for download, if the selection was split.
    pub requested_formats: Option<Vec<Option<FormatDescriptor>>>,
    /// Exact size of the single selected stream.
    pub direct_size_bytes: Option<u64>,
    /// Approximate size of the single selected stream.
    pub approx_size_bytes: Option<u64>,
}

impl ResourceInfo {
    /// Creates an empty resource with the given duration.
    #[must_use]
    pub fn new(duration_seconds: Option<f64>) -> Self {
        Self {
            duration_seconds,
            ..Self::default()
        }
    }

    /// Sets the format catalog.
    #[must_use]
    pub fn with_formats(mut self, formats: Vec<FormatDescriptor>) -> Self {
        self.formats = formats;
        self
    }

    /// Sets the selected components.
    #[must_use]
    pub fn with_requested(mut self, requested: Vec<Option<FormatDescriptor>>) -> Self {
        self.requested_formats = Some(requested);
        self
    }

    /// Sets the top-level exact size.
    #[must_use]
    pub fn with_direct_size(mut self, bytes: u64) -> Self {
        self.direct_size_bytes = Some(bytes);
        self
    }

    /// Sets the top-level approximate size.
    #[must_use]
    pub fn with_approx_size(mut self, bytes: u64) -> Self {
        self.approx_size_bytes = Some(bytes);
        self
    }

    /// Returns true if the selection produced separate components.
    #[must_use]
    pub fn is_split(&self) -> bool {
        self.requested_formats
            .as_ref()
            .is_some_and(|requested| !requested.is_empty())
    }
}
