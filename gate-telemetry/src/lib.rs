//! Observability utilities for hosts embedding the policy engine.
//!
//! The engine emits `tracing` events; this crate installs a formatting
//! subscriber for binaries and pipelines that want them printed.

#![warn(missing_docs, clippy::pedantic)]

use std::env;

use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured filter directives.
pub const LOG_ENV: &str = "CONTAINER_GATE_LOG";

const DEFAULT_FILTER: &str = "info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Filter directives could not be parsed.
    #[error("invalid log filter `{directives}`: {reason}")]
    InvalidFilter {
        /// The offending directives.
        directives: String,
        /// Parser explanation.
        reason: String,
    },
    /// A global subscriber was already installed.
    #[error("tracing subscriber already installed: {reason}")]
    AlreadyInstalled {
        /// Explanation from `tracing-subscriber`.
        reason: String,
    },
}

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    filter: String,
    with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.into(),
            with_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Returns the default configuration, with the filter replaced by
    /// [`LOG_ENV`] when that variable is set and non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self::default();
        match env::var(LOG_ENV) {
            Ok(filter) if !filter.trim().is_empty() => config.with_filter(filter),
            _ => config,
        }
    }

    /// Sets the filter directives (`EnvFilter` syntax, e.g. `gate_policy=debug`).
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Toggles printing of event targets.
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Returns the filter directives.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|err| TelemetryError::InvalidFilter {
            directives: self.filter.clone(),
            reason: err.to_string(),
        })
    }
}

/// Installs a global formatting subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for unparsable directives and
/// [`TelemetryError::AlreadyInstalled`] when a global subscriber exists.
pub fn init_tracing(config: &TelemetryConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInstalled {
            reason: err.to_string(),
        })?;
    debug!(filter = %config.filter, "tracing subscriber installed");
    Ok(())
}
