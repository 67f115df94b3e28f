//! Messages and the report returned by an evaluation.

use std::fmt::{self, Display, Formatter};

use gate_primitives::EvaluationId;
use serde::{Deserialize, Serialize};

use crate::validators::ValidatorKind;

/// Severity attached to a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A policy violation; the reporting validator failed.
    Error,
    /// An advisory condition; does not fail the evaluation on its own.
    Warning,
}

impl Severity {
    /// Returns the lowercase label for the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity-tagged diagnostic produced by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    severity: Severity,
    text: String,
}

impl Message {
    /// Creates a message with the supplied severity.
    #[must_use]
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    /// Creates an error message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }

    /// Creates a warning message.
    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, text)
    }

    /// Returns the message severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the human-readable text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true for error-severity messages.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns true for warning-severity messages.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)
    }
}

/// Pass/fail outcome of a single validator within one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorOutcome {
    kind: ValidatorKind,
    passed: bool,
}

impl ValidatorOutcome {
    pub(crate) fn new(kind: ValidatorKind, passed: bool) -> Self {
        Self { kind, passed }
    }

    /// Returns the validator that produced the outcome.
    #[must_use]
    pub fn kind(&self) -> ValidatorKind {
        self.kind
    }

    /// Returns whether the validator passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }
}

/// Read-only result of one policy evaluation.
///
/// Decoding ignores any stored `passing` flag and recomputes the verdict from
/// the outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReportRecord")]
pub struct Report {
    evaluation_id: EvaluationId,
    passing: bool,
    outcomes: Vec<ValidatorOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct ReportRecord {
    evaluation_id: EvaluationId,
    outcomes: Vec<ValidatorOutcome>,
    #[serde(default)]
    messages: Vec<Message>,
}

impl From<ReportRecord> for Report {
    fn from(record: ReportRecord) -> Self {
        Self::new(record.evaluation_id, record.outcomes, record.messages)
    }
}

impl Report {
    pub(crate) fn new(
        evaluation_id: EvaluationId,
        outcomes: Vec<ValidatorOutcome>,
        messages: Vec<Message>,
    ) -> Self {
        let passing = outcomes.iter().all(ValidatorOutcome::passed);
        Self {
            evaluation_id,
            passing,
            outcomes,
            messages,
        }
    }

    /// Returns the identifier of the evaluation run.
    #[must_use]
    pub fn evaluation_id(&self) -> EvaluationId {
        self.evaluation_id
    }

    /// Returns true when every validator passed.
    #[must_use]
    pub fn is_passing(&self) -> bool {
        self.passing
    }

    /// Returns every message in the order validators recorded them.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns error-severity messages in recorded order.
    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|message| message.is_error())
    }

    /// Returns warning-severity messages in recorded order.
    pub fn warnings(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|message| message.is_warning())
    }

    /// Returns per-validator outcomes in registry order.
    #[must_use]
    pub fn outcomes(&self) -> &[ValidatorOutcome] {
        &self.outcomes
    }

    /// Returns the validators that failed, in registry order.
    pub fn failed(&self) -> impl Iterator<Item = ValidatorKind> + '_ {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.passed())
            .map(ValidatorOutcome::kind)
    }
}
