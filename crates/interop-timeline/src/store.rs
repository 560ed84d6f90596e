//! In-memory per-patient timeline store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::domain::entry::TimelineEntry;
use crate::domain::patient_key::PatientKey;

/// Append-only timelines keyed by patient. One coarse lock guards the whole
/// map; entries are small and every operation is a push or a copy.
#[derive(Debug, Default)]
pub struct TimelineStore {
    timelines: Mutex<HashMap<PatientKey, Vec<TimelineEntry>>>,
}

impl TimelineStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to the patient's timeline. Duplicates are kept.
    pub fn add_event(&self, key: PatientKey, entry: TimelineEntry) {
        self.lock().entry(key).or_default().push(entry);
    }

    /// Snapshot of the patient's timeline; empty for unknown patients.
    #[must_use]
    pub fn get_timeline(&self, key: &PatientKey) -> Vec<TimelineEntry> {
        self.lock().get(key).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PatientKey, Vec<TimelineEntry>>> {
        self.timelines.lock().unwrap_or_else(|poisoned| {
            warn!("timeline store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
