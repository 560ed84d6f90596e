//! Query handlers for the timeline context.

use serde::Serialize;

use crate::domain::entry::TimelineEntry;
use crate::domain::patient_key::PatientKey;
use crate::store::TimelineStore;

/// The demographics a timeline was looked up with, echoed back as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRef {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Date of birth, ISO date.
    pub dob: String,
}

/// Read-only view of a patient's timeline.
#[derive(Debug, Serialize)]
pub struct PatientTimelineView {
    /// Lookup demographics.
    pub patient: PatientRef,
    /// Entries in insertion order.
    pub events: Vec<TimelineEntry>,
}

/// Looks up a timeline by raw demographics; case and surrounding whitespace
/// do not matter.
#[must_use]
pub fn get_patient_timeline(
    store: &TimelineStore,
    first_name: &str,
    last_name: &str,
    dob: &str,
) -> PatientTimelineView {
    let key = PatientKey::new(first_name, last_name, dob);
    PatientTimelineView {
        patient: PatientRef {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            dob: dob.to_owned(),
        },
        events: store.get_timeline(&key),
    }
}
