//! `SQLite` implementation of the `TelemetryLog` trait.

use async_trait::async_trait;
use interop_core::error::DomainError;
use interop_core::repository::{StoredTelemetryEvent, TelemetryLog};
use interop_core::timestamp::{format_timestamp, parse_timestamp};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::warn;

use crate::storage_error;

type TelemetryRow = (String, String, String, Option<String>, String);

/// Raw, append-only telemetry log keyed by an autoincrement sequence.
#[derive(Debug, Clone)]
pub struct SqliteTelemetryLog {
    pool: SqlitePool,
}

impl SqliteTelemetryLog {
    /// Creates a new `SqliteTelemetryLog`.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TelemetryLog for SqliteTelemetryLog {
    async fn append(&self, event: &StoredTelemetryEvent) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO telemetry_events
                (event_id, event_type, timestamp_utc, correlation_request_id, raw_payload)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(&event.event_id)
        .bind(&event.event_type)
        .bind(format_timestamp(&event.occurred_at))
        .bind(event.correlation_request_id.as_deref())
        .bind(event.payload.to_string())
        .execute(&self.pool)
        .await
        .map_err(storage_error("telemetry_events.append"))?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<StoredTelemetryEvent>, DomainError> {
        let rows: Vec<TelemetryRow> = sqlx::query_as(
            r"
            SELECT event_id, event_type, timestamp_utc, correlation_request_id, raw_payload
            FROM telemetry_events
            ORDER BY seq ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("telemetry_events.load_all"))?;

        let mut events = Vec::with_capacity(rows.len());
        for (event_id, event_type, timestamp_utc, correlation_request_id, raw_payload) in rows {
            let Some(occurred_at) = parse_timestamp(&timestamp_utc) else {
                warn!(%event_id, %timestamp_utc, "skipping telemetry row with unreadable timestamp");
                continue;
            };
            // Unparseable payloads are kept as text; validation rejects them later.
            let payload = serde_json::from_str(&raw_payload).unwrap_or(Value::String(raw_payload));
            events.push(StoredTelemetryEvent {
                event_id,
                event_type,
                occurred_at,
                correlation_request_id,
                payload,
            });
        }
        Ok(events)
    }
}
