//! Ordered message collection for a single evaluation run.

use crate::decision::{Message, Severity};

/// Append-only log of messages recorded during one evaluation.
///
/// Messages are kept in append order; nothing is removed, reordered, or
/// deduplicated. A collector belongs to exactly one run.
#[derive(Debug, Default)]
pub struct MessageCollector {
    messages: Vec<Message>,
}

impl MessageCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message with the supplied severity.
    pub fn record(&mut self, severity: Severity, text: impl Into<String>) {
        self.messages.push(Message::new(severity, text));
    }

    /// Appends an error message.
    pub fn error(&mut self, text: impl Into<String>) {
        self.record(Severity::Error, text);
    }

    /// Appends a warning message.
    pub fn warning(&mut self, text: impl Into<String>) {
        self.record(Severity::Warning, text);
    }

    /// Returns every recorded message in append order.
    #[must_use]
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Number of recorded messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consumes the collector and returns the recorded messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
