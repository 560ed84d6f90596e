//! `SQLite` implementation of the `ExecutionRepository` trait.

use async_trait::async_trait;
use interop_core::error::DomainError;
use interop_core::execution::{ExecutionStatus, ExecutionSummary, PdExecution};
use interop_core::repository::ExecutionRepository;
use interop_core::timestamp::{format_timestamp, parse_timestamp};
use sqlx::SqlitePool;

use crate::storage_error;

type ExecutionRow = (String, String, String, i64, String, i64);

/// SQLite-backed execution table. Each upsert is its own statement; the
/// engine's `ON CONFLICT` handles concurrent writers to the same id.
#[derive(Debug, Clone)]
pub struct SqliteExecutionRepository {
    pool: SqlitePool,
}

impl SqliteExecutionRepository {
    /// Creates a new `SqliteExecutionRepository`.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_column(value: u64, field: &str) -> Result<i64, DomainError> {
    i64::try_from(value)
        .map_err(|_| DomainError::Infrastructure(format!("{field} {value} exceeds column range")))
}

fn from_row(row: ExecutionRow) -> Result<PdExecution, DomainError> {
    let (execution_id, started_at, completed_at, duration_ms, status, request_count) = row;
    let corrupt = |column: &str| {
        DomainError::Infrastructure(format!("execution {execution_id}: unreadable {column}"))
    };
    Ok(PdExecution {
        started_at: parse_timestamp(&started_at).ok_or_else(|| corrupt("started_at"))?,
        completed_at: parse_timestamp(&completed_at).ok_or_else(|| corrupt("completed_at"))?,
        duration_ms: u64::try_from(duration_ms).map_err(|_| corrupt("duration_ms"))?,
        status: status.parse::<ExecutionStatus>().map_err(|_| corrupt("status"))?,
        request_count: u64::try_from(request_count).map_err(|_| corrupt("request_count"))?,
        execution_id,
    })
}

#[async_trait]
impl ExecutionRepository for SqliteExecutionRepository {
    async fn upsert_execution(&self, execution: &PdExecution) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO pd_executions
                (execution_id, started_at, completed_at, duration_ms, status, request_count)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(execution_id) DO UPDATE SET
                started_at    = excluded.started_at,
                completed_at  = excluded.completed_at,
                duration_ms   = excluded.duration_ms,
                status        = excluded.status,
                request_count = excluded.request_count
            ",
        )
        .bind(&execution.execution_id)
        .bind(format_timestamp(&execution.started_at))
        .bind(format_timestamp(&execution.completed_at))
        .bind(to_column(execution.duration_ms, "duration_ms")?)
        .bind(execution.status.as_str())
        .bind(to_column(execution.request_count, "request_count")?)
        .execute(&self.pool)
        .await
        .map_err(storage_error("pd_executions.upsert"))?;
        Ok(())
    }

    async fn list_executions(&self) -> Result<Vec<PdExecution>, DomainError> {
        let rows: Vec<ExecutionRow> = sqlx::query_as(
            r"
            SELECT execution_id, started_at, completed_at, duration_ms, status, request_count
            FROM pd_executions
            ORDER BY completed_at DESC, execution_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("pd_executions.list"))?;

        rows.into_iter().map(from_row).collect()
    }

    async fn count_executions(&self) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pd_executions")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("pd_executions.count"))?;
        Ok(count.unsigned_abs())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    async fn summarize_executions(&self) -> Result<ExecutionSummary, DomainError> {
        let (total, success_count, failure_count, average): (i64, i64, i64, Option<f64>) =
            sqlx::query_as(
                r"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'failure' THEN 1 ELSE 0 END), 0),
                    AVG(duration_ms)
                FROM pd_executions
                ",
            )
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("pd_executions.summarize"))?;

        Ok(ExecutionSummary {
            total: total.unsigned_abs(),
            success_count: success_count.unsigned_abs(),
            failure_count: failure_count.unsigned_abs(),
            average_duration_ms: average.map_or(0, |avg| avg.floor().max(0.0) as u64),
        })
    }
}
