//! Domain error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `correlation.requestId`.
    pub field: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An inbound payload failed validation; every failing field is listed.
    #[error("validation failed with {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A request was well-formed JSON but semantically unusable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A required collaborator is not configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An upstream dependency (token endpoint, PD relay) failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns the field errors carried by a validation failure, if any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_counts_field_errors() {
        let err = DomainError::Validation(vec![
            FieldError::new("eventId", "is required"),
            FieldError::new("timestamp", "is required"),
        ]);

        assert_eq!(err.to_string(), "validation failed with 2 field error(s)");
        assert_eq!(err.field_errors().map(<[FieldError]>::len), Some(2));
    }

    #[test]
    fn test_non_validation_errors_carry_no_field_errors() {
        let err = DomainError::Infrastructure("db down".into());

        assert!(err.field_errors().is_none());
    }
}
