//! Core types for the presize media size estimator.
//!
//! This crate provides the data structures shared by the presize crates:
//!
//! - [`FormatDescriptor`] - One encoded variant with optional size and bitrate metrics
//! - [`ResourceInfo`] - Normalized metadata for a resource and its selected components
//! - [`Target`] - Audio or video download target with its quality tier
//! - [`SizeEstimate`] - Total size plus the incomplete flag returned to callers
//! - [`SizeSource`] - Provenance of each component size
//! - [`EventSink`] - Injected receiver for diagnostic events

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod diagnostics;
mod error;
mod estimate;
mod format;
mod quality;
mod resource;

pub use diagnostics::{EventSink, FieldValue, MemorySink, NullSink, RecordedEvent, TracingSink};
pub use error::QualityParseError;
pub use estimate::{
    ComponentEstimate, DISCREPANCY_LOWER_RATIO, DISCREPANCY_UPPER_RATIO, Discrepancy,
    EstimateConfidence, SizeEstimate, SizeSource,
};
pub use format::{FormatDescriptor, MediaKind};
pub use quality::{AudioQuality, Target, VideoQuality};
pub use resource::ResourceInfo;
