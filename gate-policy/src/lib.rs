//! Container policy evaluation.
//!
//! A [`Policy`] is checked against a [`ContainerRecord`] by six independent
//! validators. [`PolicyEngine::execute`] runs all of them in a fixed order and
//! returns a [`Report`] with the combined verdict and the messages recorded
//! along the way.

#![warn(missing_docs, clippy::pedantic)]

pub mod decision;
pub mod engine;
pub mod error;
pub mod messages;
pub mod schema;
pub mod validators;

pub use decision::{Message, Report, Severity, ValidatorOutcome};
pub use engine::{PolicyEngine, execute};
pub use error::{PolicyError, PolicyResult};
pub use gate_primitives::ContainerRecord;
pub use messages::MessageCollector;
pub use schema::{
    EnvKeyRules, LabelRules, Megabytes, Policy, PortRange, PortRules, SizeRules, VolumeRules,
};
pub use validators::{Validator, ValidatorFn, ValidatorKind, ValidatorRegistry};
