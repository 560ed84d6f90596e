//! Test repositories: in-memory and failing implementations of the
//! persistence traits.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use interop_core::error::DomainError;
use interop_core::execution::{ExecutionSummary, PdExecution};
use interop_core::repository::{ExecutionRepository, StoredTelemetryEvent, TelemetryLog};

/// An execution repository backed by a `HashMap`, with the same upsert and
/// ordering semantics as the SQL implementation.
#[derive(Debug, Default)]
pub struct InMemoryExecutionRepository {
    rows: Mutex<HashMap<String, PdExecution>>,
}

#[async_trait]
impl ExecutionRepository for InMemoryExecutionRepository {
    async fn upsert_execution(&self, execution: &PdExecution) -> Result<(), DomainError> {
        self.rows
            .lock()
            .unwrap()
            .insert(execution.execution_id.clone(), execution.clone());
        Ok(())
    }

    async fn list_executions(&self) -> Result<Vec<PdExecution>, DomainError> {
        let mut rows: Vec<PdExecution> = self.rows.lock().unwrap().values().cloned().collect();
        rows.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then_with(|| a.execution_id.cmp(&b.execution_id))
        });
        Ok(rows)
    }

    async fn count_executions(&self) -> Result<u64, DomainError> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn summarize_executions(&self) -> Result<ExecutionSummary, DomainError> {
        Ok(ExecutionSummary::from_executions(
            self.rows.lock().unwrap().values(),
        ))
    }
}

/// An execution repository that always returns an infrastructure error.
/// Useful for testing degraded read paths.
#[derive(Debug)]
pub struct FailingExecutionRepository;

#[async_trait]
impl ExecutionRepository for FailingExecutionRepository {
    async fn upsert_execution(&self, _execution: &PdExecution) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn list_executions(&self) -> Result<Vec<PdExecution>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn count_executions(&self) -> Result<u64, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn summarize_executions(&self) -> Result<ExecutionSummary, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A telemetry log that keeps appended events in memory.
#[derive(Debug, Default)]
pub struct InMemoryTelemetryLog {
    events: Mutex<Vec<StoredTelemetryEvent>>,
}

impl InMemoryTelemetryLog {
    /// Returns a snapshot of all appended events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events(&self) -> Vec<StoredTelemetryEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Appends a row with an arbitrary payload, bypassing validation. Used to
    /// simulate rows written by older producers.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_raw(&self, event_id: &str, payload: serde_json::Value) {
        self.events.lock().unwrap().push(StoredTelemetryEvent {
            event_id: event_id.to_owned(),
            event_type: "unknown".to_owned(),
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            correlation_request_id: None,
            payload,
        });
    }
}

#[async_trait]
impl TelemetryLog for InMemoryTelemetryLog {
    async fn append(&self, event: &StoredTelemetryEvent) -> Result<(), DomainError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<StoredTelemetryEvent>, DomainError> {
        Ok(self.events())
    }
}

/// A telemetry log that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingTelemetryLog;

#[async_trait]
impl TelemetryLog for FailingTelemetryLog {
    async fn append(&self, _event: &StoredTelemetryEvent) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk full".into()))
    }

    async fn load_all(&self) -> Result<Vec<StoredTelemetryEvent>, DomainError> {
        Err(DomainError::Infrastructure("disk full".into()))
    }
}
