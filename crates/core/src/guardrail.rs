//! Guardrail signals — structured warnings and errors surfaced to the
//! caller about safety, budget, and availability conditions.
//!
//! Signals are ephemeral: they accumulate into a `GuardrailReport` for
//! the duration of one resolution call and are never persisted.

use serde::{Deserialize, Serialize};

/// Severity of a guardrail signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardrailSeverity {
    /// Informational; resolution continues.
    Warn,
    /// Something was blocked or suppressed.
    Error,
}

/// A single guardrail signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailSignal {
    pub severity: GuardrailSeverity,
    /// Stable machine-readable code (e.g. "budget.hard_cap").
    pub code: String,
    /// Human-readable detail.
    pub message: String,
}

impl GuardrailSignal {
    pub fn warn(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: GuardrailSeverity::Warn,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: GuardrailSeverity::Error,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A sink that receives guardrail signals as they are raised.
///
/// The orchestrator talks to this closed interface instead of an ad hoc
/// callback object. `GuardrailReport` is the standard implementation;
/// tests use a recording double.
pub trait GuardrailSink {
    fn raise(&mut self, signal: GuardrailSignal);
    fn clear(&mut self);
}

/// The signals accumulated during one resolution call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardrailReport {
    signals: Vec<GuardrailSignal>,
}

impl GuardrailReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> &[GuardrailSignal] {
        &self.signals
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Whether any error-severity signal was raised.
    pub fn has_errors(&self) -> bool {
        self.signals
            .iter()
            .any(|s| s.severity == GuardrailSeverity::Error)
    }

    /// Whether a signal with the given code was raised.
    pub fn contains(&self, code: &str) -> bool {
        self.signals.iter().any(|s| s.code == code)
    }
}

impl GuardrailSink for GuardrailReport {
    fn raise(&mut self, signal: GuardrailSignal) {
        tracing::debug!(code = %signal.code, severity = ?signal.severity, "guardrail raised");
        self.signals.push(signal);
    }

    fn clear(&mut self) {
        self.signals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_accumulates_and_clears() {
        let mut report = GuardrailReport::new();
        report.raise(GuardrailSignal::warn("budget.soft_cap", "nearing limit"));
        report.raise(GuardrailSignal::error("budget.hard_cap", "limit reached"));

        assert_eq!(report.signals().len(), 2);
        assert!(report.has_errors());
        assert!(report.contains("budget.soft_cap"));
        assert!(!report.contains("shield.rejected"));

        report.clear();
        assert!(report.is_empty());
        assert!(!report.has_errors());
    }

    #[test]
    fn severity_serializes_lowercase() {
        let signal = GuardrailSignal::warn("local.unavailable", "no accelerator");
        let json = serde_json::to_string(&signal).unwrap();
        assert!(json.contains(r#""severity":"warn""#));
    }
}
