//! Core shared types for container policy evaluation.

#![warn(missing_docs, clippy::pedantic)]

mod container;
mod error;
mod ids;

/// Inspect-style container metadata consumed by policy evaluation.
pub use container::{ContainerConfig, ContainerRecord, ContainerRecordBuilder, port_number};
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Unique identifier attached to each policy evaluation run.
pub use ids::EvaluationId;
