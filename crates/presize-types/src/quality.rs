//! Quality tiers and download targets.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::QualityParseError;

/// Output bitrate tier for audio downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    /// 96 kbit/s.
    Low,
    /// 192 kbit/s.
    #[default]
    Medium,
    /// 320 kbit/s.
    High,
}

impl AudioQuality {
    /// Returns the user-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Returns the parameter token passed to the downloader.
    #[must_use]
    pub const fn parameter(&self) -> &'static str {
        match self {
            Self::Low => "96",
            Self::Medium => "192",
            Self::High => "320",
        }
    }

    /// Returns the bitrate in kbit/s.
    #[must_use]
    pub const fn kbps(&self) -> u32 {
        match self {
            Self::Low => 96,
            Self::Medium => 192,
            Self::High => 320,
        }
    }

    /// Returns all tiers, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

impl std::fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for AudioQuality {
    type Err = QualityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "96" | "low" => Ok(Self::Low),
            "192" | "medium" => Ok(Self::Medium),
            "320" | "high" => Ok(Self::High),
            _ => Err(QualityParseError::Audio(s.to_string())),
        }
    }
}

/// Resolution ceiling for video downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VideoQuality {
    /// 480 pixels high.
    #[serde(rename = "480p")]
    P480,
    /// 720 pixels high.
    #[default]
    #[serde(rename = "720p")]
    P720,
    /// 1080 pixels high.
    #[serde(rename = "1080p")]
    P1080,
    /// 2160 pixels high.
    #[serde(rename = "4k")]
    P2160,
}

impl VideoQuality {
    /// Returns the user-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::P2160 => "4K",
        }
    }

    /// Returns the parameter token passed to the downloader.
    #[must_use]
    pub const fn parameter(&self) -> &'static str {
        match self {
            Self::P480 => "480",
            Self::P720 => "720",
            Self::P1080 => "1080",
            Self::P2160 => "2160",
        }
    }

    /// Returns the height ceiling in pixels.
    #[must_use]
    pub const fn max_height(&self) -> u32 {
        match self {
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
            Self::P2160 => 2160,
        }
    }

    /// Returns all ceilings, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::P480, Self::P720, Self::P1080, Self::P2160]
    }
}

impl std::fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for VideoQuality {
    type Err = QualityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "480" | "480p" => Ok(Self::P480),
            "720" | "720p" => Ok(Self::P720),
            "1080" | "1080p" => Ok(Self::P1080),
            "2160" | "2160p" | "4k" => Ok(Self::P2160),
            _ => Err(QualityParseError::Video(s.to_string())),
        }
    }
}

/// What the caller intends to download.
///
/// For audio the tier governs the re-encode bitrate of the output, not
/// which source stream is fetched: the best audio stream is always
/// selected, so estimates reflect the source stream size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "quality", rename_all = "lowercase")]
pub enum Target {
    /// Audio-only download.
    Audio(AudioQuality),
    /// Video download capped at a resolution.
    Video(VideoQuality),
}

impl Target {
    /// Parses a target from the `(is_audio, quality_parameter)` pair used at
    /// the service boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a configured tier for that kind.
    pub fn from_parts(is_audio: bool, quality_parameter: &str) -> Result<Self, QualityParseError> {
        if is_audio {
            quality_parameter.parse().map(Self::Audio)
        } else {
            quality_parameter.parse().map(Self::Video)
        }
    }

    /// Returns true for audio-only targets.
    #[must_use]
    pub const fn is_audio(&self) -> bool {
        matches!(self, Self::Audio(_))
    }

    /// Returns the quality parameter token.
    #[must_use]
    pub const fn parameter(&self) -> &'static str {
        match self {
            Self::Audio(quality) => quality.parameter(),
            Self::Video(quality) => quality.parameter(),
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::Video(VideoQuality::default())
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio(quality) => write!(f, "audio {quality}"),
            Self::Video(quality) => write!(f, "video {quality}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_quality_parse() {
        assert_eq!("192".parse::<AudioQuality>().unwrap(), AudioQuality::Medium);
        assert_eq!("High".parse::<AudioQuality>().unwrap(), AudioQuality::High);
        assert_eq!(" low ".parse::<AudioQuality>().unwrap(), AudioQuality::Low);
        assert!("128".parse::<AudioQuality>().is_err());
    }

    #[test]
    fn test_video_quality_parse() {
        assert_eq!("720".parse::<VideoQuality>().unwrap(), VideoQuality::P720);
        assert_eq!("1080p".parse::<VideoQuality>().unwrap(), VideoQuality::P1080);
        assert_eq!("4K".parse::<VideoQuality>().unwrap(), VideoQuality::P2160);
        assert_eq!(
            "360".parse::<VideoQuality>(),
            Err(QualityParseError::Video("360".to_string()))
        );
    }

    #[test]
    fn test_parameters_round_trip() {
        for quality in AudioQuality::all() {
            assert_eq!(quality.parameter().parse::<AudioQuality>().unwrap(), *quality);
        }
        for quality in VideoQuality::all() {
            assert_eq!(quality.parameter().parse::<VideoQuality>().unwrap(), *quality);
            assert_eq!(quality.parameter(), quality.max_height().to_string());
        }
    }

    #[test]
    fn test_target_from_parts() {
        assert_eq!(
            Target::from_parts(true, "320").unwrap(),
            Target::Audio(AudioQuality::High)
        );
        assert_eq!(
            Target::from_parts(false, "2160").unwrap(),
            Target::Video(VideoQuality::P2160)
        );
        // Audio tokens are not video ceilings.
        assert!(Target::from_parts(false, "192").is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(AudioQuality::default(), AudioQuality::Medium);
        assert_eq!(Target::default(), Target::Video(VideoQuality::P720));
        assert_eq!(Target::default().to_string(), "video 720p");
    }
}
