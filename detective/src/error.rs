//! Error types for artifact detection and extraction.
//!
//! Only unreadable input and configuration problems are errors. Malformed or
//! foreign artifact content is reported through return values (`None`,
//! `unknown`, or an invalid `ValidationResult`) and never through this type.

use std::path::PathBuf;

use artifact_detective_core::UnknownArtifactType;
use thiserror::Error;

/// Errors that can occur while reading artifacts or loading configuration.
#[derive(Debug, Error)]
pub enum DetectiveError {
    /// An artifact, log or output file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A configured pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A configured artifact type is not in the catalog.
    #[error(transparent)]
    InvalidArtifactType(#[from] UnknownArtifactType),

    /// The collector's worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl DetectiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`DetectiveError`].
pub type Result<T> = std::result::Result<T, DetectiveError>;
