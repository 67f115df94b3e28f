//! Error types for policy construction.

use thiserror::Error;

/// Errors raised while building or decoding policy values.
///
/// Evaluation itself never fails; these only surface when a policy document is
/// turned into typed values.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Port range was not of the form `<low>-<high>`.
    #[error("invalid port range `{range}`: {reason}")]
    InvalidPortRange {
        /// The offending range text.
        range: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
    /// Size limit was not a non-negative decimal number of megabytes.
    #[error("invalid size limit `{value}`: {reason}")]
    InvalidSizeLimit {
        /// The offending limit text.
        value: String,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },
}

/// Result alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
