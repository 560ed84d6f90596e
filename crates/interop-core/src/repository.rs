//! Persistence abstractions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::execution::{ExecutionSummary, PdExecution};

/// Stored representation of an ingested telemetry event.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTelemetryEvent {
    /// Caller-supplied event identifier (not unique).
    pub event_id: String,
    /// Free-form event type.
    pub event_type: String,
    /// Event time reported by the producer.
    pub occurred_at: DateTime<Utc>,
    /// Correlation request id, when the event carried one.
    pub correlation_request_id: Option<String>,
    /// Serialized copy of the full event, used for re-materialization.
    pub payload: serde_json::Value,
}

/// Durable append-only log of raw telemetry events.
#[async_trait]
pub trait TelemetryLog: Send + Sync {
    /// Append one event to the log.
    async fn append(&self, event: &StoredTelemetryEvent) -> Result<(), DomainError>;

    /// Load every logged event in arrival order.
    async fn load_all(&self) -> Result<Vec<StoredTelemetryEvent>, DomainError>;
}

/// Keyed table of materialized executions.
///
/// Implementations rely on the storage engine's atomic upsert; each call is
/// an independent transaction.
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Insert the execution, or replace every field of the row with the same
    /// `execution_id`.
    async fn upsert_execution(&self, execution: &PdExecution) -> Result<(), DomainError>;

    /// All executions ordered by completion time, newest first.
    async fn list_executions(&self) -> Result<Vec<PdExecution>, DomainError>;

    /// Total row count.
    async fn count_executions(&self) -> Result<u64, DomainError>;

    /// Aggregate counts and mean duration over the whole table.
    async fn summarize_executions(&self) -> Result<ExecutionSummary, DomainError>;
}
