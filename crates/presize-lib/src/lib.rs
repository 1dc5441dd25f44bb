//! Pre-download size estimation for yt-dlp style media formats.
//!
//! This is a facade crate that re-exports functionality from the presize
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use presize_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = SizeService::new(YtDlpSource::default());
//!     let estimate = service
//!         .estimate("https://www.youtube.com/watch?v=dQw4w9WgXcQ", false, "1080")
//!         .await;
//!     println!("{}", estimate.label());
//! }
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use presize_types::*;

// Re-export catalog normalization and selection
pub use presize_catalog::{
    Alternative, CatalogError, CatalogNormalizer, Comparison, FormatClass, HeightFilter,
    Selection, SelectionExpr, SelectionParseError, Selector,
};

// Re-export the size engine
pub use presize_estimate::{
    BitrateError, ProxyMeasure, SizeEngine, Strategy, bytes_from_bitrate,
};

// Re-export metadata fetching
#[cfg(feature = "fetch")]
pub use presize_fetch::{
    ExtractorConfig, FetchError, JsonFileSource, MetadataSource, PROGRAM_ENV, SizeService,
    YtDlpSource,
};

/// Prelude module for convenient imports.
///
/// ```
/// use presize_lib::prelude::*;
/// ```
pub mod prelude {
    pub use presize_types::{
        AudioQuality, EventSink, FormatDescriptor, MemorySink, NullSink, ResourceInfo,
        SizeEstimate, SizeSource, Target, TracingSink, VideoQuality,
    };

    pub use presize_catalog::{CatalogNormalizer, SelectionExpr};

    pub use presize_estimate::SizeEngine;

    #[cfg(feature = "fetch")]
    pub use presize_fetch::{
        ExtractorConfig, JsonFileSource, MetadataSource, SizeService, YtDlpSource,
    };
}
