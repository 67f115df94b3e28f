//! Error types for document loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while reading or decoding documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading a document.
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Source [`std::io::Error`].
        #[source]
        source: std::io::Error,
    },
    /// JSON document could not be decoded.
    #[error("invalid JSON document: {source}")]
    Json {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },
    /// YAML document could not be decoded.
    #[error("invalid YAML document: {source}")]
    Yaml {
        /// Source [`serde_yaml::Error`].
        #[from]
        source: serde_yaml::Error,
    },
    /// Inspect output was an array without any records.
    #[error("inspect output contains no container records")]
    EmptyInspect,
}

/// Result type alias for loading operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
