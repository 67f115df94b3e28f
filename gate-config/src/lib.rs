//! Loading of policy documents and container inspect records.
//!
//! The policy engine only ever sees typed values; this crate turns YAML/JSON
//! text into them.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::{Format, load_container, load_policy, parse_container, parse_policy};
