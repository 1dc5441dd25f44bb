//! Format catalog normalization and format selection for presize.
//!
//! This crate sits between the metadata extractor and the size engine:
//!
//! - [`CatalogNormalizer`] - Converts extractor JSON into [`presize_types::ResourceInfo`]
//! - [`SelectionExpr`] - Parses, builds and evaluates format selection expressions
//! - [`Selection`] - The formats an expression picked from a catalog

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod normalize;
mod selection;

pub use error::{CatalogError, SelectionParseError};
pub use normalize::CatalogNormalizer;
pub use selection::{
    Alternative, Comparison, FormatClass, HeightFilter, Selection, SelectionExpr, Selector,
};
