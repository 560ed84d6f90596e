//! Commands for the patient-discovery context.

use chrono::NaiveDate;
use interop_core::error::{DomainError, FieldError};
use serde::Deserialize;

/// Patient demographics used for the search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth.
    pub dob: NaiveDate,
}

impl Demographics {
    /// Returns a copy with names trimmed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if either name is blank.
    pub fn normalized(&self) -> Result<Self, DomainError> {
        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push(FieldError::new("demographics.firstName", "must not be blank"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(FieldError::new("demographics.lastName", "must not be blank"));
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }
        Ok(Self {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            dob: self.dob,
        })
    }
}

/// Command to submit a patient-discovery search upstream.
#[derive(Debug, Clone)]
pub struct SubmitPdSearch {
    /// Caller-supplied request id; doubles as the correlation id when set.
    pub request_id: Option<String>,
    /// Who to search for.
    pub demographics: Demographics,
}
