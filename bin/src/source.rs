//! Metadata source selection shared by the estimating commands.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use presize_lib::prelude::*;

use crate::display::spinner;

/// Where to get metadata and what to estimate.
#[derive(Args, Debug)]
pub(crate) struct SourceArgs {
    /// Media URL, or a saved info JSON path with --info-json
    pub(crate) locator: String,

    /// Estimate the audio-only download
    #[arg(long)]
    pub(crate) audio: bool,

    /// Quality tier (e.g. 192, high, 1080, 4k). Defaults to 192 or 720p
    #[arg(short, long)]
    pub(crate) quality: Option<String>,

    /// Treat the locator as a saved yt-dlp info JSON file
    #[arg(long)]
    pub(crate) info_json: bool,

    /// yt-dlp executable (defaults to $PRESIZE_YTDLP, then PATH)
    #[arg(long = "yt-dlp", value_name = "PATH")]
    pub(crate) yt_dlp: Option<String>,

    /// Extraction timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub(crate) timeout: Option<u64>,
}

impl SourceArgs {
    /// Resolves the requested target.
    pub(crate) fn target(&self) -> Result<Target> {
        resolve_target(self.audio, self.quality.as_deref())
    }

    /// Builds the metadata source these arguments describe.
    pub(crate) fn metadata_source(&self) -> Box<dyn MetadataSource> {
        if self.info_json {
            return Box::new(JsonFileSource);
        }

        let mut config = ExtractorConfig::default();
        if let Some(program) = &self.yt_dlp {
            config = config.with_program(program);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        tracing::debug!(program = %config.program.display(), timeout = ?config.timeout, "using yt-dlp");
        Box::new(YtDlpSource::new(config))
    }

    /// Fetches metadata and estimates its size, showing a spinner unless
    /// `hide_progress` is set. Returns `None` if the metadata could not be
    /// obtained.
    pub(crate) async fn inspect(
        &self,
        target: Target,
        hide_progress: bool,
    ) -> Option<(ResourceInfo, SizeEstimate)> {
        let service = SizeService::new(self.metadata_source());
        let progress = spinner(&format!("Fetching metadata for {}", self.locator), hide_progress);
        let result = service.inspect(&self.locator, target).await;
        progress.finish_and_clear();
        result
    }
}

/// Builds a target from the `--audio` flag and an optional quality token,
/// using the default tier when no token is given.
pub(crate) fn resolve_target(audio: bool, quality: Option<&str>) -> Result<Target> {
    match quality {
        Some(token) => {
            Target::from_parts(audio, token).with_context(|| format!("Invalid quality: {token}"))
        }
        None if audio => Ok(Target::Audio(AudioQuality::default())),
        None => Ok(Target::Video(VideoQuality::default())),
    }
}
