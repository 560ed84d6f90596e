//! Command handlers for the timeline context.

use tracing::debug;

use crate::domain::entry::TimelineEntry;
use crate::domain::patient_key::PatientKey;
use crate::store::TimelineStore;

/// Appends an entry to the timeline of the patient identified by the raw
/// demographics.
pub fn record_patient_event(
    store: &TimelineStore,
    first_name: &str,
    last_name: &str,
    dob: &str,
    entry: TimelineEntry,
) {
    let key = PatientKey::new(first_name, last_name, dob);
    debug!(entry_type = %entry.entry_type, status = %entry.status, "recording timeline entry");
    store.add_event(key, entry);
}
