//! Error types for presize.

use thiserror::Error;

/// Error returned when a quality token does not match any configured tier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QualityParseError {
    /// Unknown audio tier.
    #[error("invalid audio quality '{0}', expected one of: 96, 192, 320, low, medium, high")]
    Audio(String),

    /// Unknown video ceiling.
    #[error("invalid video quality '{0}', expected one of: 480, 720, 1080, 2160, 480p, 720p, 1080p, 4k")]
    Video(String),
}
