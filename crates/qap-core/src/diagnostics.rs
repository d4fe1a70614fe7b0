//! Warning collection for non-fatal anomalies.
//!
//! Subproblem failures, objective mismatches and similar conditions must not
//! abort a run; they are collected here with enough context to inspect
//! afterwards and are serialized into the result artifact.

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but the run continued (e.g. skipped subproblem pair)
    Warning,
    /// A component failed outright but the run preserved partial results
    Error,
}

/// A single diagnostic issue encountered during a run
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g. "separation", "verification")
    pub category: String,
    /// Human-readable description
    pub message: String,
    /// Optional entity reference (e.g. "SP(2,5)", "x[0,1]")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;
        if let Some(entity) = &self.entity {
            write!(f, " ({entity})")?;
        }
        Ok(())
    }
}

/// Collection of diagnostic issues for one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, category: impl Into<String>, message: impl Into<String>) {
        self.issues.push(DiagnosticIssue {
            severity: Severity::Warning,
            category: category.into(),
            message: message.into(),
            entity: None,
        });
    }

    pub fn add_warning_with_entity(
        &mut self,
        category: impl Into<String>,
        message: impl Into<String>,
        entity: impl Into<String>,
    ) {
        self.issues.push(DiagnosticIssue {
            severity: Severity::Warning,
            category: category.into(),
            message: message.into(),
            entity: Some(entity.into()),
        });
    }

    pub fn add_error(&mut self, category: impl Into<String>, message: impl Into<String>) {
        self.issues.push(DiagnosticIssue {
            severity: Severity::Error,
            category: category.into(),
            message: message.into(),
            entity: None,
        });
    }

    pub fn issues(&self) -> &[DiagnosticIssue] {
        &self.issues
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Absorb another collection, preserving order.
    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }
}
