//! The six policy validators and the registry that orders them.
//!
//! Each validator inspects one policy dimension, appends messages to the
//! run's collector, and returns whether the container satisfied it. A missing
//! policy section always passes without messages.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use gate_primitives::{ContainerRecord, port_number};
use serde::{Deserialize, Serialize};

use crate::messages::MessageCollector;
use crate::schema::Policy;

/// Signature shared by every validator.
pub type ValidatorFn = fn(&Policy, &ContainerRecord, &mut MessageCollector) -> bool;

/// Identity of a registered validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    /// Disallowed label keys.
    Labels,
    /// Disallowed environment-variable names.
    EnvKeys,
    /// Volume prohibition.
    Volumes,
    /// At least one exposed port.
    PortRequirement,
    /// Exposed ports within an inclusive range.
    PortRange,
    /// Size limit and warning threshold.
    Size,
}

impl ValidatorKind {
    /// Every validator in execution order.
    pub const ALL: [Self; 6] = [
        Self::Labels,
        Self::EnvKeys,
        Self::Volumes,
        Self::PortRequirement,
        Self::PortRange,
        Self::Size,
    ];

    /// Returns the snake_case name used in logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Labels => "labels",
            Self::EnvKeys => "env_keys",
            Self::Volumes => "volumes",
            Self::PortRequirement => "port_requirement",
            Self::PortRange => "port_range",
            Self::Size => "size",
        }
    }

    /// Returns the function implementing this validator.
    #[must_use]
    pub fn function(self) -> ValidatorFn {
        match self {
            Self::Labels => validate_labels,
            Self::EnvKeys => validate_env_keys,
            Self::Volumes => validate_volumes,
            Self::PortRequirement => validate_port_requirement,
            Self::PortRange => validate_port_range,
            Self::Size => validate_size,
        }
    }
}

impl Display for ValidatorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registered validator: identity plus implementation.
#[derive(Clone, Copy)]
pub struct Validator {
    kind: ValidatorKind,
    check: ValidatorFn,
}

impl Validator {
    /// Returns the validator identity.
    #[must_use]
    pub fn kind(&self) -> ValidatorKind {
        self.kind
    }

    /// Runs the validator.
    pub fn run(
        &self,
        policy: &Policy,
        container: &ContainerRecord,
        messages: &mut MessageCollector,
    ) -> bool {
        (self.check)(policy, container, messages)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("kind", &self.kind).finish()
    }
}

/// Fixed, ordered list of validators executed for every evaluation.
///
/// The order determines message order in a report and never depends on the
/// policy being evaluated.
#[derive(Debug, Clone)]
pub struct ValidatorRegistry {
    validators: Vec<Validator>,
}

impl ValidatorRegistry {
    /// Returns the standard registry of all six validators.
    #[must_use]
    pub fn new() -> Self {
        let validators = ValidatorKind::ALL
            .into_iter()
            .map(|kind| Validator {
                kind,
                check: kind.function(),
            })
            .collect();
        Self { validators }
    }

    /// Number of registered validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns true when no validators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Iterates validators in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fails when any disallowed label key is present on the container.
pub fn validate_labels(
    policy: &Policy,
    container: &ContainerRecord,
    messages: &mut MessageCollector,
) -> bool {
    let disallow = policy.labels().disallow();
    if disallow.is_empty() {
        return true;
    }

    let present: Vec<&str> = container
        .label_keys()
        .filter(|key| disallow.contains(*key))
        .collect();
    if present.is_empty() {
        return true;
    }

    messages.error(format!("disallowed labels present: {}", present.join(", ")));
    false
}

/// Fails when any disallowed environment-variable name is set on the container.
pub fn validate_env_keys(
    policy: &Policy,
    container: &ContainerRecord,
    messages: &mut MessageCollector,
) -> bool {
    let disallow = policy.env_keys().disallow();
    if disallow.is_empty() {
        return true;
    }

    let names: BTreeSet<&str> = container.env_entries().map(|(name, _)| name).collect();
    let present: Vec<&str> = disallow
        .iter()
        .map(String::as_str)
        .filter(|key| names.contains(key))
        .collect();
    if present.is_empty() {
        return true;
    }

    messages.error(format!(
        "disallowed environment keys present: {}",
        present.join(", ")
    ));
    false
}

/// Fails when volumes are disallowed and the container declares any.
pub fn validate_volumes(
    policy: &Policy,
    container: &ContainerRecord,
    messages: &mut MessageCollector,
) -> bool {
    if !policy.volumes().disallowed() {
        return true;
    }

    let paths: Vec<&str> = container.volume_paths().collect();
    if paths.is_empty() {
        return true;
    }

    messages.error(format!(
        "volumes are disallowed but {} declared: {}",
        paths.len(),
        paths.join(", ")
    ));
    false
}

/// Fails when ports are required and the container exposes none.
pub fn validate_port_requirement(
    policy: &Policy,
    container: &ContainerRecord,
    messages: &mut MessageCollector,
) -> bool {
    if !policy.ports().required() || container.exposed_ports().next().is_some() {
        return true;
    }

    messages.error("at least one exposed port is required, none declared");
    false
}

/// Fails when any exposed port falls outside the configured range.
///
/// A container without exposed ports always passes; requiring a port is the
/// port-requirement validator's concern. Keys without a numeric port cannot be
/// inside any range and count as violations.
pub fn validate_port_range(
    policy: &Policy,
    container: &ContainerRecord,
    messages: &mut MessageCollector,
) -> bool {
    let Some(range) = policy.ports().range() else {
        return true;
    };

    let outside: Vec<&str> = container
        .exposed_ports()
        .filter(|key| !port_number(key).is_ok_and(|port| range.contains(port)))
        .collect();
    if outside.is_empty() {
        return true;
    }

    messages.error(format!(
        "exposed ports outside allowed range {range}: {}",
        outside.join(", ")
    ));
    false
}

/// Checks the container size against the configured maximum and warning threshold.
///
/// A warning threshold at or above the maximum is a contradictory policy and
/// fails before any size comparison. Crossing the warning threshold records a
/// warning without failing.
pub fn validate_size(
    policy: &Policy,
    container: &ContainerRecord,
    messages: &mut MessageCollector,
) -> bool {
    let rules = policy.size();
    if let (Some(max), Some(warning)) = (rules.max(), rules.warning()) {
        if warning >= max {
            messages.error(format!(
                "size warning threshold {warning} must be below the maximum {max}"
            ));
            return false;
        }
    }

    let size = container.size_bytes();
    let mut passed = true;

    if let Some(max) = rules.max() {
        if max.exceeded_by(size) {
            messages.error(format!(
                "container size {size} bytes exceeds the maximum of {max} ({} bytes)",
                max.bytes()
            ));
            passed = false;
        }
    }

    if let Some(warning) = rules.warning() {
        if warning.exceeded_by(size) {
            messages.warning(format!(
                "container size {size} bytes exceeds the warning threshold of {warning} ({} bytes)",
                warning.bytes()
            ));
        }
    }

    passed
}
