//! Policy-compliance gate for container images and instances.
//!
//! Depend on this crate to evaluate inspect records against a policy. The
//! loading and telemetry crates sit behind feature flags so embedders that
//! already hold typed values can leave them out.
//!
//! ```
//! use container_gate::policy::{ContainerRecord, Megabytes, Policy, execute};
//!
//! let policy = Policy::new().with_size_max(Megabytes::from(10));
//! let container = ContainerRecord::builder().size(10_000_000).build();
//!
//! let report = execute(&policy, &container);
//! assert!(report.is_passing());
//! assert!(report.messages().is_empty());
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use gate_primitives as primitives;

/// Policy schema, validators, and the execution engine.
pub use gate_policy as policy;

/// Policy document and inspect record loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use gate_config as config;

/// Tracing subscriber setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use gate_telemetry as telemetry;
