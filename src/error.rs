//! Error types for the Paideia library.
//!
//! All failures are represented by the [`PaideiaError`] enum. Recoverable
//! conditions (unknown input categories, an untrained model) carry enough
//! context for the caller to self-correct, while internal-consistency
//! failures are surfaced as fatal signals for the operator.

use std::io;

use thiserror::Error;

/// The main error type for Paideia operations.
#[derive(Error, Debug)]
pub enum PaideiaError {
    /// An input category fell outside a fitted vocabulary. Recoverable:
    /// the caller should be shown the valid options.
    #[error("unknown {attribute} '{value}', valid values: {valid:?}")]
    UnknownCategory {
        /// Name of the categorical attribute.
        attribute: String,
        /// The rejected value.
        value: String,
        /// The full fitted vocabulary for this attribute.
        valid: Vec<String>,
    },

    /// A prediction was requested before any bundle was trained or loaded.
    #[error("model not trained: {0}")]
    ModelNotTrained(String),

    /// Training data lacked class diversity for an attribute. Fatal to
    /// that training run.
    #[error("attribute '{attribute}' requires at least 2 distinct classes, found {found}")]
    InsufficientClasses { attribute: String, found: usize },

    /// Training dataset was missing required columns or was otherwise
    /// malformed. Fatal to that training run.
    #[error("schema error: {0}")]
    Schema(String),

    /// An internal decode of an out-of-range label code. Should never occur
    /// in correct operation.
    #[error("label code {code} out of range for vocabulary of {size} entries")]
    InvalidCode { code: usize, size: usize },

    /// A persisted bundle carried an unsupported format version.
    #[error("unsupported bundle format version {found} (expected {expected})")]
    BundleVersion { found: u32, expected: u32 },

    /// Invalid argument supplied by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal inconsistency that indicates a programming defect.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O errors (bundle persistence, training data files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`PaideiaError`].
pub type Result<T> = std::result::Result<T, PaideiaError>;

impl PaideiaError {
    /// Create a new not-trained error.
    pub fn not_trained<S: Into<String>>(msg: S) -> Self {
        PaideiaError::ModelNotTrained(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        PaideiaError::Schema(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        PaideiaError::InvalidInput(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        PaideiaError::Internal(msg.into())
    }

    /// Whether this error is recoverable by the caller adjusting its
    /// request (as opposed to an operator-level failure).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PaideiaError::UnknownCategory { .. }
                | PaideiaError::ModelNotTrained(_)
                | PaideiaError::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = PaideiaError::schema("missing column 'intent'");
        assert_eq!(error.to_string(), "schema error: missing column 'intent'");

        let error = PaideiaError::not_trained("run training first");
        assert_eq!(error.to_string(), "model not trained: run training first");
    }

    #[test]
    fn test_unknown_category_lists_valid_values() {
        let error = PaideiaError::UnknownCategory {
            attribute: "topic".to_string(),
            value: "Quantum".to_string(),
            valid: vec!["Algebra".to_string(), "Geometry".to_string()],
        };
        let text = error.to_string();
        assert!(text.contains("topic"));
        assert!(text.contains("Quantum"));
        assert!(text.contains("Algebra"));
        assert!(text.contains("Geometry"));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(PaideiaError::not_trained("x").is_recoverable());
        assert!(PaideiaError::invalid_input("x").is_recoverable());
        assert!(!PaideiaError::schema("x").is_recoverable());
        assert!(!PaideiaError::InvalidCode { code: 9, size: 3 }.is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = PaideiaError::from(io_error);

        match error {
            PaideiaError::Io(_) => {}
            _ => panic!("expected Io error variant"),
        }
    }
}
