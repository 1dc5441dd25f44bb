//! Metadata fetch errors.

use std::path::PathBuf;
use std::time::Duration;

use presize_catalog::CatalogError;
use thiserror::Error;

/// Errors that can occur while obtaining resource metadata.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The extractor could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Executable that failed to start.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The extractor did not finish in time.
    #[error("extractor timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The extractor exited unsuccessfully.
    #[error("extractor exited with status {}: {stderr}", exit_code(.code))]
    ExitStatus {
        /// Exit code, `None` if terminated by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The metadata was not valid JSON.
    #[error("invalid metadata JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A saved info JSON could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The metadata could not be normalized.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |code| code.to_string())
}
