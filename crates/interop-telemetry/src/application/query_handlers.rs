//! Query handlers for the telemetry context.
//!
//! Execution reads go through [`Degradable`]: a storage failure yields an
//! empty list or zero counts plus the captured error, never a failed request.

use interop_core::degrade::Degradable;
use interop_core::execution::{ExecutionSummary, PdExecution};
use interop_core::repository::ExecutionRepository;

use crate::domain::events::TelemetryEvent;
use crate::store::TelemetryStore;

/// Every stored event in arrival order.
#[must_use]
pub fn list_events(store: &TelemetryStore) -> Vec<TelemetryEvent> {
    store.get_all()
}

/// All executions, newest completion first.
pub async fn list_executions(repo: &dyn ExecutionRepository) -> Degradable<Vec<PdExecution>> {
    Degradable::from_result(repo.list_executions().await, "executions.list")
}

/// Total number of executions.
pub async fn count_executions(repo: &dyn ExecutionRepository) -> Degradable<u64> {
    Degradable::from_result(repo.count_executions().await, "executions.count")
}

/// Aggregate counts and mean duration.
pub async fn summarize_executions(repo: &dyn ExecutionRepository) -> Degradable<ExecutionSummary> {
    Degradable::from_result(repo.summarize_executions().await, "executions.summarize")
}
