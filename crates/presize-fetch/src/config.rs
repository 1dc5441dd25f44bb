//! Extractor configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the `yt-dlp` executable.
pub const PROGRAM_ENV: &str = "PRESIZE_YTDLP";

/// Program name used when nothing else resolves.
const DEFAULT_PROGRAM: &str = "yt-dlp";

/// Configuration for running the metadata extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Extractor executable.
    pub program: PathBuf,
    /// Time allowed for one extraction.
    pub timeout: Duration,
    /// Additional arguments passed before the locator.
    pub extra_args: Vec<String>,
}

impl ExtractorConfig {
    /// Sets the extractor executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the extraction timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Appends an extra argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Resolves the extractor executable from [`PROGRAM_ENV`], then `PATH`.
    #[must_use]
    pub fn resolve_program() -> PathBuf {
        std::env::var_os(PROGRAM_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| which::which(DEFAULT_PROGRAM).ok())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: Self::resolve_program(),
            timeout: Duration::from_secs(60),
            extra_args: Vec::new(),
        }
    }
}
