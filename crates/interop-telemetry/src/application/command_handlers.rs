//! Command handlers for the telemetry context.
//!
//! Ingestion validates and stores events; materialization derives execution
//! records from the stored events. The two run independently, and neither
//! lets a storage failure abort the caller.

use interop_core::degrade::Degradable;
use interop_core::error::DomainError;
use interop_core::repository::{ExecutionRepository, StoredTelemetryEvent, TelemetryLog};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::events::TelemetryEvent;
use crate::domain::materializer::{self, Materialization};
use crate::domain::validator::validate_event;
use crate::store::TelemetryStore;

/// Acknowledgement returned for an accepted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    /// Identifier of the accepted event.
    pub event_id: String,
    /// Whether the durable telemetry log also accepted the event.
    pub persisted: bool,
}

fn to_stored_event(event: &TelemetryEvent) -> StoredTelemetryEvent {
    StoredTelemetryEvent {
        event_id: event.event_id.clone(),
        event_type: event.event_type.clone(),
        occurred_at: event.timestamp,
        correlation_request_id: event.correlation_request_id().map(str::to_owned),
        payload: event.to_payload(),
    }
}

/// Appends an already-typed event to the in-memory store and, best-effort,
/// to the durable log. Returns whether the log accepted it.
pub async fn record_event(
    event: TelemetryEvent,
    store: &TelemetryStore,
    log: &dyn TelemetryLog,
) -> bool {
    let stored = to_stored_event(&event);
    store.add(event);
    match log.append(&stored).await {
        Ok(()) => true,
        Err(err) => {
            warn!(event_id = %stored.event_id, error = %err, "telemetry log append failed");
            false
        }
    }
}

/// Validates a raw payload and records the resulting event.
///
/// # Errors
///
/// Returns `DomainError::Validation` when the payload is rejected; nothing is
/// stored in that case. Storage failures are logged, not returned.
#[instrument(skip_all)]
pub async fn handle_ingest_event(
    payload: &Value,
    store: &TelemetryStore,
    log: &dyn TelemetryLog,
) -> Result<IngestReceipt, DomainError> {
    let event = validate_event(payload).inspect_err(|err| {
        warn!(error = %err, details = ?err.field_errors(), "telemetry payload rejected");
    })?;

    info!(
        event_id = %event.event_id,
        event_type = %event.event_type,
        source = ?event.source.as_ref().and_then(|s| s.system.as_deref()),
        status = ?event.outcome.as_ref().and_then(|o| o.status.as_deref()),
        protocol = ?event.protocol.as_ref().and_then(|p| p.standard.as_deref()),
        "telemetry event received"
    );

    let event_id = event.event_id.clone();
    let persisted = record_event(event, store, log).await;
    Ok(IngestReceipt {
        event_id,
        persisted,
    })
}

/// Reloads the in-memory store from the durable log, typically at startup.
/// Returns the number of events restored; rows that no longer validate are
/// skipped.
#[instrument(skip_all)]
pub async fn handle_restore_from_log(
    store: &TelemetryStore,
    log: &dyn TelemetryLog,
) -> Degradable<usize> {
    let outcome = Degradable::from_result(log.load_all().await, "telemetry_log.load_all");
    let mut restored = 0;
    for stored in &outcome.value {
        match validate_event(&stored.payload) {
            Ok(event) => {
                store.add(event);
                restored += 1;
            }
            Err(err) => {
                warn!(event_id = %stored.event_id, error = %err, "skipping unreadable logged event");
            }
        }
    }
    info!(restored, "telemetry store restored from log");
    Degradable {
        value: restored,
        error: outcome.error,
    }
}

/// Materializes one event. Returns `true` when an execution row was written.
pub async fn materialize_event(event: &TelemetryEvent, repo: &dyn ExecutionRepository) -> bool {
    match materializer::materialize(event) {
        Materialization::Ignored => false,
        Materialization::Skipped(reason) => {
            warn!(event_id = %event.event_id, %reason, "pd execution materialization skipped");
            false
        }
        Materialization::Ready(execution) => match repo.upsert_execution(&execution).await {
            Ok(()) => {
                debug!(execution_id = %execution.execution_id, "pd execution upserted");
                true
            }
            Err(err) => {
                error!(
                    execution_id = %execution.execution_id,
                    error = %err,
                    "pd execution upsert failed"
                );
                false
            }
        },
    }
}

/// Scans every stored event and upserts the derived executions. Safe to
/// re-run: the table converges to the same contents.
#[instrument(skip_all)]
pub async fn handle_materialize_all(
    store: &TelemetryStore,
    repo: &dyn ExecutionRepository,
) -> usize {
    let events = store.get_all();
    let mut materialized = 0;
    for event in &events {
        if materialize_event(event, repo).await {
            materialized += 1;
        }
    }
    info!(scanned = events.len(), materialized, "pd execution materialization finished");
    materialized
}
