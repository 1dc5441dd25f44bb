//! Error types for catalog normalization.

use thiserror::Error;

/// Errors that can occur while parsing a format selection expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionParseError {
    /// The expression or one of its alternatives is empty.
    #[error("empty format selection in '{0}'")]
    Empty(String),

    /// Selector name not supported.
    #[error("unknown format selector '{0}', expected best, bestvideo or bestaudio")]
    UnknownSelector(String),

    /// Filter is not of the form `[field<op>value]`.
    #[error("invalid filter '{0}'")]
    InvalidFilter(String),

    /// Filter on a field other than height.
    #[error("unsupported filter field '{0}', only height is supported")]
    UnsupportedField(String),

    /// More than two formats merged in one alternative.
    #[error("at most two formats can be merged, got '{0}'")]
    TooManyComponents(String),
}

/// Errors that can occur while normalizing extractor metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The payload root is not a JSON object.
    #[error("metadata payload is not an object")]
    NotAnObject,

    /// The selection expression could not be parsed.
    #[error(transparent)]
    Selection(#[from] SelectionParseError),
}
