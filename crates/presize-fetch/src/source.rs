//! Metadata sources.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::{ExtractorConfig, FetchError};

/// Provides raw extractor metadata for a locator.
#[async_trait]
pub trait MetadataSource: Send + Sync + std::fmt::Debug {
    /// Fetches the info JSON for `locator`, selecting formats with
    /// `expression`.
    async fn fetch(&self, locator: &str, expression: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: MetadataSource + ?Sized> MetadataSource for Box<T> {
    async fn fetch(&self, locator: &str, expression: &str) -> Result<Value, FetchError> {
        (**self).fetch(locator, expression).await
    }
}

/// Runs `yt-dlp` and parses its single-JSON dump.
#[derive(Debug, Clone, Default)]
pub struct YtDlpSource {
    config: ExtractorConfig,
}

impl YtDlpSource {
    /// Creates a source with the given configuration.
    #[must_use]
    pub const fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Returns the extractor configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Builds the extractor argument list.
    #[must_use]
    pub fn args(&self, locator: &str, expression: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            "-f",
            expression,
        ]
        .into_iter()
        .map(String::from)
        .collect();
        args.extend(self.config.extra_args.iter().cloned());
        args.push(locator.to_string());
        args
    }
}

#[async_trait]
impl MetadataSource for YtDlpSource {
    async fn fetch(&self, locator: &str, expression: &str) -> Result<Value, FetchError> {
        let program = &self.config.program;
        let output = tokio::time::timeout(
            self.config.timeout,
            Command::new(program)
                .args(self.args(locator, expression))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| FetchError::Timeout(self.config.timeout))?
        .map_err(|source| FetchError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(FetchError::ExitStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// Reads an info JSON previously saved with `yt-dlp --write-info-json` or
/// `--dump-single-json`. The locator is the file path.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileSource;

#[async_trait]
impl MetadataSource for JsonFileSource {
    async fn fetch(&self, locator: &str, _expression: &str) -> Result<Value, FetchError> {
        let bytes = tokio::fs::read(locator)
            .await
            .map_err(|source| FetchError::ReadFile {
                path: PathBuf::from(locator),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_args() {
        let source = YtDlpSource::new(
            ExtractorConfig::default()
                .with_program("yt-dlp")
                .with_arg("--cookies-from-browser")
                .with_arg("firefox"),
        );

        let args = source.args("https://example.com/v/1", "bestaudio/best");

        assert_eq!(
            args,
            vec![
                "--dump-single-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                "-f",
                "bestaudio/best",
                "--cookies-from-browser",
                "firefox",
                "https://example.com/v/1",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_program() {
        let source = YtDlpSource::new(
            ExtractorConfig::default().with_program("/nonexistent/presize-test-yt-dlp"),
        );

        let err = source.fetch("locator", "best").await.unwrap_err();

        assert!(matches!(err, FetchError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program() {
        let source = YtDlpSource::new(
            ExtractorConfig::default()
                .with_program("false")
                .with_timeout(Duration::from_secs(10)),
        );

        let err = source.fetch("locator", "best").await.unwrap_err();

        assert!(matches!(err, FetchError::ExitStatus { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_output_is_invalid_json() {
        let source = YtDlpSource::new(
            ExtractorConfig::default()
                .with_program("true")
                .with_timeout(Duration::from_secs(10)),
        );

        let err = source.fetch("locator", "best").await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidJson(_)));
    }

    #[tokio::test]
    async fn test_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"id": "abc", "duration": 12.5}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let value = JsonFileSource.fetch(&path, "best").await.unwrap();

        assert_eq!(value["id"], "abc");
        assert_eq!(value["duration"], 12.5);
    }

    #[tokio::test]
    async fn test_boxed_source() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{}").unwrap();
        let source: Box<dyn MetadataSource> = Box::new(JsonFileSource);

        let value = source
            .fetch(file.path().to_str().unwrap(), "best")
            .await
            .unwrap();

        assert!(value.as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.info.json");
        let err = JsonFileSource
            .fetch(missing.to_str().unwrap(), "best")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ReadFile { .. }));

        let broken = dir.path().join("broken.info.json");
        std::fs::write(&broken, "{not json").unwrap();
        let err = JsonFileSource
            .fetch(broken.to_str().unwrap(), "best")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidJson(_)));
    }
}
