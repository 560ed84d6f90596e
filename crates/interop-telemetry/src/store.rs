//! In-memory, append-only telemetry event store.

use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::domain::events::TelemetryEvent;

/// Thread-safe ordered collection of validated events.
///
/// A single mutex serializes `add`, `get_all`, and `clear`. It is held only
/// for the in-memory push or copy, never across I/O.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl TelemetryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event. Never fails.
    pub fn add(&self, event: TelemetryEvent) {
        self.lock().push(event);
    }

    /// Returns a snapshot copy of every event in arrival order.
    #[must_use]
    pub fn get_all(&self) -> Vec<TelemetryEvent> {
        self.lock().clone()
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no events are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes every event. Reset/test use only.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the Vec half-mutated
    // (push and clear are atomic from our side), so recover the guard.
    fn lock(&self) -> MutexGuard<'_, Vec<TelemetryEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| {
            warn!("telemetry store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::thread;

    fn event(id: usize) -> TelemetryEvent {
        let timestamp = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        TelemetryEvent::new(format!("evt-{id}"), "telemetry.test", timestamp)
    }

    #[test]
    fn test_add_and_get_all_preserve_arrival_order() {
        let store = TelemetryStore::new();
        store.add(event(1));
        store.add(event(2));

        let ids: Vec<String> = store.get_all().into_iter().map(|e| e.event_id).collect();

        assert_eq!(ids, vec!["evt-1", "evt-2"]);
    }

    #[test]
    fn test_duplicate_event_ids_are_kept_as_separate_entries() {
        let store = TelemetryStore::new();
        store.add(event(1));
        store.add(event(1));

        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_appends() {
        let store = TelemetryStore::new();
        store.add(event(1));

        let snapshot = store.get_all();
        store.add(event(2));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear_empties_the_store() {
        let store = TelemetryStore::new();
        store.add(event(1));

        store.clear();

        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_appends_never_expose_partial_snapshots() {
        // Arrange
        let store = Arc::new(TelemetryStore::new());
        let writers: Vec<_> = (0..4)
            .map(|writer| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..250 {
                        store.add(event(writer * 1_000 + i));
                    }
                })
            })
            .collect();

        // Act
        let mut snapshots = Vec::new();
        for _ in 0..50 {
            snapshots.push(store.get_all());
        }
        for writer in writers {
            writer.join().unwrap();
        }

        // Assert
        let final_events = store.get_all();
        assert_eq!(final_events.len(), 1_000);
        for snapshot in snapshots {
            assert!(snapshot.len() <= final_events.len());
            assert_eq!(snapshot[..], final_events[..snapshot.len()]);
        }
    }
}
