use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanEngineError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid input in option {}: {} — {}", .index + 1, .field, .reason)]
    InvalidOption {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("No valid loan options: {0}")]
    EmptyComparison(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Coarse classification of engine failures for callers that only need to
/// decide how to surface an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    EmptyComparison,
    Serialization,
}

impl LoanEngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoanEngineError::InvalidInput { .. } | LoanEngineError::InvalidOption { .. } => {
                ErrorKind::Validation
            }
            LoanEngineError::EmptyComparison(_) => ErrorKind::EmptyComparison,
            LoanEngineError::SerializationError(_) => ErrorKind::Serialization,
        }
    }

    /// The offending field, when the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            LoanEngineError::InvalidInput { field, .. }
            | LoanEngineError::InvalidOption { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LoanEngineError {
    fn from(e: serde_json::Error) -> Self {
        LoanEngineError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_error_reports_one_based_index() {
        let err = LoanEngineError::InvalidOption {
            index: 2,
            field: "principal".into(),
            reason: "not a number".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid input in option 3: principal — not a number"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field(), Some("principal"));
    }

    #[test]
    fn test_empty_comparison_kind() {
        let err = LoanEngineError::EmptyComparison("all options blank".into());
        assert_eq!(err.kind(), ErrorKind::EmptyComparison);
        assert_eq!(err.field(), None);
    }
}
