//! InterOps store: `SQLite` persistence for materialized executions and the
//! raw telemetry log.

pub mod error;
pub mod schema;
pub mod sqlite_execution_repository;
pub mod sqlite_telemetry_log;

pub use error::StoreError;
pub use schema::{connect, migrate};
pub use sqlite_execution_repository::SqliteExecutionRepository;
pub use sqlite_telemetry_log::SqliteTelemetryLog;

use interop_core::error::DomainError;

pub(crate) fn storage_error(operation: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |err| DomainError::Infrastructure(format!("{operation}: {err}"))
}
