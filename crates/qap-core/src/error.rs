//! Unified error types for the QAP solver suite.
//!
//! This module provides a common error type [`QapError`] that can represent
//! errors from any part of the system: instance parsing, model construction,
//! solver backends and verification. Fatal conditions (configuration and
//! dimension errors) are raised through this type; non-fatal anomalies such
//! as objective mismatches are collected as diagnostics instead and never
//! abort a run.

use thiserror::Error;

/// Unified error type for all QAP operations.
#[derive(Error, Debug)]
pub enum QapError {
    /// I/O errors (file access etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing errors in instance or solution files
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors (negative costs, malformed permutations, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Instance/solution/tensor shape disagreements
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid settings detected before or during model construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configured but unimplemented code path was requested
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A transportation subproblem reported infeasibility. This cannot occur
    /// for snapshots inside the assignment polytope and indicates an
    /// upstream bug; the engine downgrades it to a diagnostic and skips the
    /// pair.
    #[error("Benders subproblem ({i},{j}) reported infeasible")]
    SubproblemInfeasible { i: usize, j: usize },

    /// Solver backend errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using QapError.
pub type QapResult<T> = Result<T, QapError>;

impl From<anyhow::Error> for QapError {
    fn from(err: anyhow::Error) -> Self {
        QapError::Other(err.to_string())
    }
}

impl From<String> for QapError {
    fn from(s: String) -> Self {
        QapError::Other(s)
    }
}

impl From<&str> for QapError {
    fn from(s: &str) -> Self {
        QapError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QapError::Config("threads setting is <= 0 and not -1".into());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("threads"));
    }

    #[test]
    fn test_subproblem_infeasible_context() {
        let err = QapError::SubproblemInfeasible { i: 2, j: 5 };
        assert!(err.to_string().contains("(2,5)"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: QapError = io_err.into();
        assert!(matches!(err, QapError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> QapResult<()> {
            Err(QapError::Validation("test".into()))
        }

        fn outer() -> QapResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
