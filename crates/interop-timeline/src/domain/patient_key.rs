//! Normalized patient identity.

use std::fmt;

/// Composite key of first name, last name, and date of birth: each part
/// trimmed and case-folded, joined with `|`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatientKey(String);

impl PatientKey {
    /// Builds the key from raw demographics.
    #[must_use]
    pub fn new(first_name: &str, last_name: &str, dob: &str) -> Self {
        Self(format!(
            "{}|{}|{}",
            first_name.trim().to_lowercase(),
            last_name.trim().to_lowercase(),
            dob.trim().to_lowercase()
        ))
    }

    /// The normalized key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
