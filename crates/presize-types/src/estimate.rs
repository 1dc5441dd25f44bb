//! Size estimate returned to callers.

use serde::{Deserialize, Serialize};

use crate::MediaKind;

/// Bytes per mebibyte, as used in display labels.
const MIB: f64 = 1024.0 * 1024.0;

/// Actual sizes below this fraction of a rough estimate are a discrepancy.
pub const DISCREPANCY_LOWER_RATIO: f64 = 0.5;

/// Actual sizes above this multiple of a rough estimate are a discrepancy.
pub const DISCREPANCY_UPPER_RATIO: f64 = 2.0;

/// Where a component's size figure came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SizeSource {
    /// Exact size reported for the component.
    Direct,
    /// Approximate size reported for the component.
    Approx,
    /// Exact size of an H.264 stream at the same height.
    ProxyDirect {
        /// Format id of the proxy stream.
        proxy_id: String,
    },
    /// Approximate size of an H.264 stream at the same height.
    ProxyApprox {
        /// Format id of the proxy stream.
        proxy_id: String,
    },
    /// Duration times the bitrate of an H.264 stream at the same height.
    ProxyBitrate {
        /// Format id of the proxy stream.
        proxy_id: String,
    },
    /// Duration times the component's own bitrate.
    OwnBitrate,
    /// Nothing usable; the component contributes zero.
    Unresolved,
}

impl SizeSource {
    /// Returns a short identifier for the source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Approx => "approx",
            Self::ProxyDirect { .. } => "proxy_direct",
            Self::ProxyApprox { .. } => "proxy_approx",
            Self::ProxyBitrate { .. } => "proxy_bitrate",
            Self::OwnBitrate => "own_bitrate",
            Self::Unresolved => "unresolved",
        }
    }

    /// Returns true if the figure was reported exactly by the source.
    #[must_use]
    pub const fn is_exact(&self) -> bool {
        matches!(self, Self::Direct)
    }

    /// Returns the proxy format id, if a proxy was used.
    #[must_use]
    pub fn proxy_id(&self) -> Option<&str> {
        match self {
            Self::ProxyDirect { proxy_id }
            | Self::ProxyApprox { proxy_id }
            | Self::ProxyBitrate { proxy_id } => Some(proxy_id),
            _ => None,
        }
    }
}

impl std::fmt::Display for SizeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.proxy_id() {
            Some(proxy_id) => write!(f, "{} ({proxy_id})", self.as_str()),
            None => write!(f, "{}", self.as_str()),
        }
    }
}

/// Size resolved for a single selected component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEstimate {
    /// Position within the requested components.
    pub index: usize,
    /// Format id, `None` if the component was missing.
    pub format_id: Option<String>,
    /// Media kind of the component.
    pub kind: MediaKind,
    /// Resolved size in bytes.
    pub bytes: u64,
    /// Provenance of `bytes`.
    #[serde(flatten)]
    pub source: SizeSource,
}

impl ComponentEstimate {
    /// Creates an entry for a component the source did not describe.
    #[must_use]
    pub const fn missing(index: usize) -> Self {
        Self {
            index,
            format_id: None,
            kind: MediaKind::None,
            bytes: 0,
            source: SizeSource::Unresolved,
        }
    }
}

/// How much trust a caller can put in an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateConfidence {
    /// Every figure was reported by the source.
    Exact,
    /// Some figure was inferred, but the total is positive.
    Rough,
    /// Nothing could be determined.
    Unknown,
}

impl EstimateConfidence {
    /// Returns the confidence as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Rough => "rough",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EstimateConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Estimated download size of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SizeEstimate {
    /// Total size in bytes.
    pub total_bytes: u64,
    /// True if any figure was inferred or missing.
    pub is_incomplete: bool,
    /// Per-component breakdown, empty unless the selection was split.
    pub components: Vec<ComponentEstimate>,
}

impl SizeEstimate {
    /// Creates an estimate from a single exact figure.
    #[must_use]
    pub const fn exact(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            is_incomplete: false,
            components: Vec::new(),
        }
    }

    /// Creates the degraded result used when nothing can be determined.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            total_bytes: 0,
            is_incomplete: true,
            components: Vec::new(),
        }
    }

    /// Sums component figures into an estimate.
    #[must_use]
    pub fn from_components(components: Vec<ComponentEstimate>) -> Self {
        let total_bytes = components
            .iter()
            .fold(0u64, |total, component| total.saturating_add(component.bytes));
        let is_incomplete = components.iter().any(|c| !c.source.is_exact());
        Self {
            total_bytes,
            is_incomplete,
            components,
        }
    }

    /// Returns the `(total_bytes, is_incomplete)` pair.
    #[must_use]
    pub const fn as_pair(&self) -> (u64, bool) {
        (self.total_bytes, self.is_incomplete)
    }

    /// Returns the confidence level of the estimate.
    #[must_use]
    pub const fn confidence(&self) -> EstimateConfidence {
        if !self.is_incomplete {
            EstimateConfidence::Exact
        } else if self.total_bytes > 0 {
            EstimateConfidence::Rough
        } else {
            EstimateConfidence::Unknown
        }
    }

    /// Returns the total in mebibytes.
    #[must_use]
    pub fn megabytes(&self) -> f64 {
        self.total_bytes as f64 / MIB
    }

    /// Formats the estimate the way it is shown next to a download button.
    #[must_use]
    pub fn label(&self) -> String {
        match self.confidence() {
            EstimateConfidence::Exact => format!("Est. size: {:.2} MB", self.megabytes()),
            EstimateConfidence::Rough => {
                format!("Rough est: ~{:.2} MB (bitrate based)", self.megabytes())
            }
            EstimateConfidence::Unknown => "Size: Unknown (detailed info unavailable)".to_string(),
        }
    }

    /// Compares a finished download against this estimate.
    ///
    /// Only rough estimates are checked: exact figures come from the source
    /// and an unknown estimate has nothing to compare.
    #[must_use]
    pub fn discrepancy(&self, actual_bytes: u64) -> Option<Discrepancy> {
        if self.confidence() != EstimateConfidence::Rough {
            return None;
        }
        let estimated = self.total_bytes as f64;
        let actual = actual_bytes as f64;
        let within = estimated * DISCREPANCY_LOWER_RATIO <= actual
            && actual <= estimated * DISCREPANCY_UPPER_RATIO;
        (!within).then_some(Discrepancy {
            estimated_bytes: self.total_bytes,
            actual_bytes,
        })
    }
}

impl std::fmt::Display for SizeEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// A rough estimate that turned out far from the actual download size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// The rough estimate.
    pub estimated_bytes: u64,
    /// The size actually downloaded.
    pub actual_bytes: u64,
}

impl Discrepancy {
    /// Returns actual size divided by the estimate.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.actual_bytes as f64 / self.estimated_bytes as f64
    }
}

impl std::fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Initial rough estimate (~{:.2} MB) differed significantly from actual size ({:.2} MB).",
            self.estimated_bytes as f64 / MIB,
            self.actual_bytes as f64 / MIB,
        )
    }
}
