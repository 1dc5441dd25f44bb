//! Metadata extraction and the size estimation service for presize.
//!
//! This crate connects the estimator to real metadata:
//!
//! - [`MetadataSource`] - Async provider of raw extractor JSON
//! - [`YtDlpSource`] - Runs `yt-dlp` with a timeout
//! - [`JsonFileSource`] - Reads a saved info JSON
//! - [`ExtractorConfig`] - Executable, timeout and extra arguments
//! - [`SizeService`] - Fetch, normalize and estimate in one call
//! - [`FetchError`] - Errors that can occur while obtaining metadata

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod service;
mod source;

pub use config::{ExtractorConfig, PROGRAM_ENV};
pub use error::FetchError;
pub use service::SizeService;
pub use source::{JsonFileSource, MetadataSource, YtDlpSource};
