//! Size resolution engine for the presize media size estimator.
//!
//! This crate turns a normalized resource into a size estimate:
//!
//! - [`SizeEngine`] - Resolves every selected component and sums the result
//! - [`Strategy`] - Ordered ways of obtaining a component's size
//! - [`ProxyMeasure`] - Ordered ways of measuring an H.264 proxy stream
//! - [`bytes_from_bitrate`] - Duration and bitrate arithmetic
//! - [`BitrateError`] - Reasons a bitrate-derived size is unavailable

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bitrate;
mod engine;
mod strategy;

pub use bitrate::{BitrateError, bytes_from_bitrate};
pub use engine::SizeEngine;
pub use strategy::{
    AUDIO_CHAIN, PROXY_MEASURES, ProxyMeasure, ResolveContext, Resolved, Strategy,
    UNUSABLE_CHAIN, VIDEO_CHAIN,
};
