//! Size derivation from duration and bitrate.

use thiserror::Error;

/// Reasons a bitrate-derived size cannot be computed.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum BitrateError {
    /// Duration not reported.
    #[error("duration is unknown")]
    MissingDuration,

    /// Bitrate not reported.
    #[error("bitrate is unknown")]
    MissingBitrate,

    /// Duration is zero, negative or not finite.
    #[error("invalid duration {0}s")]
    InvalidDuration(f64),

    /// Bitrate is negative or not finite.
    #[error("invalid bitrate {0}kbps")]
    InvalidBitrate(f64),
}

/// Estimates a stream's size as `duration * (kbps / 8) * 1000`, truncated.
///
/// # Errors
///
/// Returns an error if either input is missing or out of range.
pub fn bytes_from_bitrate(
    duration_seconds: Option<f64>,
    bitrate_kbps: Option<f64>,
) -> Result<u64, BitrateError> {
    let duration = duration_seconds.ok_or(BitrateError::MissingDuration)?;
    let bitrate = bitrate_kbps.ok_or(BitrateError::MissingBitrate)?;

    if !duration.is_finite() || duration <= 0.0 {
        return Err(BitrateError::InvalidDuration(duration));
    }
    if !bitrate.is_finite() || bitrate < 0.0 {
        return Err(BitrateError::InvalidBitrate(bitrate));
    }

    Ok((duration * (bitrate / 8.0) * 1000.0) as u64)
}
