//! Error types for fixture loading.

use crate::error::MockError;
use thiserror::Error;

/// Fixture loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Unknown file type
    #[error("Unknown file type: {0}")]
    UnknownFileType(String),
    /// Fixture file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Glob pattern is invalid or a matched path could not be read
    #[error("glob error: {0}")]
    Glob(String),
    #[error("no fixture files matched '{0}'")]
    NoFilesMatched(String),
    /// Fixture parsed but describes an impossible mock
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),
    #[error(transparent)]
    Mock(#[from] MockError),
}
