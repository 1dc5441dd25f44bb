//! Format descriptors for the encoded variants of a resource.

use serde::{Deserialize, Serialize};

/// Codec tag prefix identifying an H.264 stream.
const H264_PREFIX: &str = "avc1";

/// Kind of media carried by a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Carries a video stream (possibly muxed with audio).
    Video,
    /// Carries only an audio stream.
    Audio,
    /// Carries neither; the descriptor is unusable.
    None,
}

impl MediaKind {
    /// Returns the kind as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One encoded variant offered by the source.
///
/// Every metric is optional: a field the source did not report is `None`,
/// never a placeholder zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Identifier, unique within a resource's catalog.
    pub id: String,
    /// Video codec tag (e.g. "avc1.640028", "vp9"), `None` if absent.
    pub video_codec: Option<String>,
    /// Audio codec tag (e.g. "opus", "mp4a.40.2"), `None` if absent.
    pub audio_codec: Option<String>,
    /// Frame height in pixels.
    pub resolution_height: Option<u32>,
    /// Video bitrate in kbit/s.
    pub video_bitrate_kbps: Option<f64>,
    /// Overall bitrate in kbit/s.
    pub overall_bitrate_kbps: Option<f64>,
    /// Audio bitrate in kbit/s.
    pub audio_bitrate_kbps: Option<f64>,
    /// Exact size reported by the source.
    pub direct_size_bytes: Option<u64>,
    /// Approximate size reported by the source.
    pub approx_size_bytes: Option<u64>,
}

impl FormatDescriptor {
    /// Creates a descriptor with no codecs and no metrics.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Creates a video-only descriptor.
    #[must_use]
    pub fn video(id: impl Into<String>, codec: impl Into<String>, height: u32) -> Self {
        Self {
            id: id.into(),
            video_codec: Some(codec.into()),
            resolution_height: Some(height),
            ..Self::default()
        }
    }

    /// Creates an audio-only descriptor.
    #[must_use]
    pub fn audio(id: impl Into<String>, codec: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            audio_codec: Some(codec.into()),
            ..Self::default()
        }
    }

    /// Adds an audio codec, turning a video-only descriptor into a muxed one.
    #[must_use]
    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = Some(codec.into());
        self
    }

    /// Sets the exact size.
    #[must_use]
    pub fn with_direct_size(mut self, bytes: u64) -> Self {
        self.direct_size_bytes = Some(bytes);
        self
    }

    /// Sets the approximate size.
    #[must_use]
    pub fn with_approx_size(mut self, bytes: u64) -> Self {
        self.approx_size_bytes = Some(bytes);
        self
    }

    /// Sets the video bitrate.
    #[must_use]
    pub fn with_video_bitrate(mut self, kbps: f64) -> Self {
        self.video_bitrate_kbps = Some(kbps);
        self
    }

    /// Sets the overall bitrate.
    #[must_use]
    pub fn with_overall_bitrate(mut self, kbps: f64) -> Self {
        self.overall_bitrate_kbps = Some(kbps);
        self
    }

    /// Sets the audio bitrate.
    #[must_use]
    pub fn with_audio_bitrate(mut self, kbps: f64) -> Self {
        self.audio_bitrate_kbps = Some(kbps);
        self
    }

    /// Returns the media kind derived from the codec tags.
    #[must_use]
    pub const fn media_kind(&self) -> MediaKind {
        match (&self.video_codec, &self.audio_codec) {
            (Some(_), _) => MediaKind::Video,
            (None, Some(_)) => MediaKind::Audio,
            (None, None) => MediaKind::None,
        }
    }

    /// Returns the codec tag used for proxy matching (the video codec).
    #[must_use]
    pub fn codec_tag(&self) -> &str {
        self.video_codec.as_deref().unwrap_or("none")
    }

    /// Returns true if this carries video and no audio.
    #[must_use]
    pub const fn is_video_only(&self) -> bool {
        self.video_codec.is_some() && self.audio_codec.is_none()
    }

    /// Returns true if this carries audio and no video.
    #[must_use]
    pub const fn is_audio_only(&self) -> bool {
        self.video_codec.is_none() && self.audio_codec.is_some()
    }

    /// Returns true if this carries both video and audio.
    #[must_use]
    pub const fn is_muxed(&self) -> bool {
        self.video_codec.is_some() && self.audio_codec.is_some()
    }

    /// Returns true if the video codec is H.264.
    #[must_use]
    pub fn is_h264(&self) -> bool {
        self.video_codec
            .as_deref()
            .is_some_and(|codec| codec.starts_with(H264_PREFIX))
    }

    /// Returns true if this can stand in for `other` when estimating size:
    /// a video-only H.264 stream at the same height.
    #[must_use]
    pub fn is_proxy_for(&self, other: &Self) -> bool {
        self.id != other.id
            && self.is_video_only()
            && self.is_h264()
            && self.resolution_height == other.resolution_height
    }

    /// Returns the bitrate the video size is derived from: the video
    /// bitrate, falling back to the overall bitrate. A zero video bitrate
    /// counts as unreported.
    #[must_use]
    pub fn video_bitrate_or_overall(&self) -> Option<f64> {
        self.video_bitrate_kbps
            .filter(|kbps| *kbps > 0.0)
            .or(self.overall_bitrate_kbps)
    }

    /// Returns the best bitrate figure available for ranking.
    #[must_use]
    pub fn ranking_bitrate(&self) -> f64 {
        self.overall_bitrate_kbps
            .or(self.video_bitrate_kbps)
            .or(self.audio_bitrate_kbps)
            .unwrap_or(0.0)
    }
}

impl std::fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}", self.id, self.media_kind())?;
        if let Some(height) = self.resolution_height {
            write!(f, " {height}p")?;
        }
        write!(f, ", {})", self.codec_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_codecs() {
        assert_eq!(
            FormatDescriptor::video("137", "avc1.640028", 1080).media_kind(),
            MediaKind::Video
        );
        assert_eq!(
            FormatDescriptor::audio("140", "mp4a.40.2").media_kind(),
            MediaKind::Audio
        );
        assert_eq!(
            FormatDescriptor::video("18", "avc1.42001E", 360)
                .with_audio_codec("mp4a.40.2")
                .media_kind(),
            MediaKind::Video
        );
        assert_eq!(FormatDescriptor::new("sb0").media_kind(), MediaKind::None);
    }

    #[test]
    fn test_proxy_candidate() {
        let vp9 = FormatDescriptor::video("248", "vp9", 1080);
        let avc = FormatDescriptor::video("137", "avc1.640028", 1080);
        let avc_720 = FormatDescriptor::video("136", "avc1.4d401f", 720);
        let muxed = FormatDescriptor::video("22", "avc1.64001F", 1080).with_audio_codec("mp4a");

        assert!(avc.is_proxy_for(&vp9));
        assert!(!avc.is_proxy_for(&avc));
        assert!(!avc_720.is_proxy_for(&vp9));
        assert!(!muxed.is_proxy_for(&vp9));
        assert!(!vp9.is_proxy_for(&avc));
    }

    #[test]
    fn test_video_bitrate_fallback() {
        let only_overall = FormatDescriptor::video("1", "vp9", 720).with_overall_bitrate(900.0);
        assert_eq!(only_overall.video_bitrate_or_overall(), Some(900.0));

        let both = only_overall.clone().with_video_bitrate(800.0);
        assert_eq!(both.video_bitrate_or_overall(), Some(800.0));

        let zero_video = only_overall.with_video_bitrate(0.0);
        assert_eq!(zero_video.video_bitrate_or_overall(), Some(900.0));
    }

    #[test]
    fn test_display() {
        let video = FormatDescriptor::video("248", "vp9", 1080);
        assert_eq!(video.to_string(), "248 (video 1080p, vp9)");
        let audio = FormatDescriptor::audio("251", "opus");
        assert_eq!(audio.to_string(), "251 (audio, none)");
    }
}
