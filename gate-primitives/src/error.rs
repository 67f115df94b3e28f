//! Shared error definitions for gate primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the gate crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided evaluation identifier could not be parsed.
    #[error("invalid evaluation id: {source}")]
    InvalidEvaluationId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// Exposed port key does not start with a decimal port number.
    #[error("invalid exposed port `{key}`: {reason}")]
    InvalidPortKey {
        /// The offending `<port>/<proto>` key.
        key: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}
