//! Policy execution engine.

use gate_primitives::{ContainerRecord, EvaluationId};
use tracing::{debug, debug_span, info, warn};

use crate::decision::{Report, ValidatorOutcome};
use crate::messages::MessageCollector;
use crate::schema::Policy;
use crate::validators::ValidatorRegistry;

/// Runs every registered validator against a policy and container pair.
///
/// The engine holds no per-run state, so a single instance can be shared
/// across threads and evaluate many containers concurrently.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    registry: ValidatorRegistry,
}

impl PolicyEngine {
    /// Creates an engine backed by the standard validator registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registry used for evaluation.
    #[must_use]
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Evaluates `container` against `policy`.
    ///
    /// Every validator runs in registry order, even after one fails, so the
    /// report carries all applicable messages. The verdict is the conjunction
    /// of the individual outcomes.
    #[must_use]
    pub fn execute(&self, policy: &Policy, container: &ContainerRecord) -> Report {
        let evaluation_id = EvaluationId::random();
        let span = debug_span!("evaluate", evaluation = %evaluation_id);
        let _entered = span.enter();

        let mut messages = MessageCollector::new();
        let outcomes: Vec<ValidatorOutcome> = self
            .registry
            .iter()
            .map(|validator| {
                let passed = validator.run(policy, container, &mut messages);
                debug!(validator = %validator.kind(), passed, "validator finished");
                ValidatorOutcome::new(validator.kind(), passed)
            })
            .collect();

        let report = Report::new(evaluation_id, outcomes, messages.into_messages());
        let errors = report.errors().count();
        let warnings = report.warnings().count();
        if report.is_passing() {
            info!(%evaluation_id, warnings, "container satisfies policy");
        } else {
            warn!(%evaluation_id, errors, warnings, "container violates policy");
        }

        report
    }
}

/// Evaluates `container` against `policy` with the standard registry.
#[must_use]
pub fn execute(policy: &Policy, container: &ContainerRecord) -> Report {
    PolicyEngine::new().execute(policy, container)
}
