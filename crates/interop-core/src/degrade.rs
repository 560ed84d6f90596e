//! Explicit "log and degrade" outcome for read paths.
//!
//! Storage failures on read paths must never take down the caller. Instead of
//! swallowing the error, handlers return a [`Degradable`] carrying the
//! fallback value together with the error that caused the fallback, so the
//! boundary can still answer and tests can assert on the degraded state.

use tracing::error;

use crate::error::DomainError;

/// A value that may have been substituted with a fallback after a failure.
#[derive(Debug)]
pub struct Degradable<T> {
    /// The value to hand to the caller.
    pub value: T,
    /// The error that forced the fallback, if any.
    pub error: Option<DomainError>,
}

impl<T> Degradable<T> {
    /// Wraps a value obtained without failure.
    #[must_use]
    pub fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    /// Returns `true` when the value is a fallback.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Discards the error and returns the value.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: Default> Degradable<T> {
    /// Converts a store result, logging the error and substituting
    /// `T::default()` on failure.
    #[must_use]
    pub fn from_result(result: Result<T, DomainError>, operation: &'static str) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(err) => {
                error!(operation, error = %err, "store read failed, returning fallback");
                Self {
                    value: T::default(),
                    error: Some(err),
                }
            }
        }
    }
}
