//! Integration tests for the `SQLite` execution table and telemetry log.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use interop_core::execution::{ExecutionStatus, ExecutionSummary, PdExecution};
use interop_core::repository::{ExecutionRepository, StoredTelemetryEvent, TelemetryLog};
use interop_store::{SqliteExecutionRepository, SqliteTelemetryLog, migrate};
use serde_json::json;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// A single-connection in-memory pool; every connection to `sqlite::memory:`
/// is its own database, so the pool must never open a second one.
async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

async fn migrated_pool() -> SqlitePool {
    let pool = memory_pool().await;
    migrate(&pool).await.unwrap();
    pool
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

fn execution(id: &str, status: ExecutionStatus, duration_ms: u64, offset_minutes: i64) -> PdExecution {
    let completed_at = base_time() + TimeDelta::minutes(offset_minutes);
    PdExecution {
        execution_id: id.to_owned(),
        started_at: completed_at - TimeDelta::milliseconds(i64::try_from(duration_ms).unwrap()),
        completed_at,
        duration_ms,
        status,
        request_count: 1,
    }
}

// --- migration ---

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let pool = memory_pool().await;

    migrate(&pool).await.unwrap();
    migrate(&pool).await.unwrap();

    let repo = SqliteExecutionRepository::new(pool);
    assert_eq!(repo.count_executions().await.unwrap(), 0);
}

#[tokio::test]
async fn test_migrate_moves_legacy_request_id_table_aside() {
    // Arrange
    let pool = memory_pool().await;
    sqlx::query(
        "CREATE TABLE pd_executions (request_id TEXT PRIMARY KEY, started_at TEXT, \
         completed_at TEXT, duration_ms INTEGER, outcome TEXT, success INTEGER)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO pd_executions (request_id) VALUES ('old-1')")
        .execute(&pool)
        .await
        .unwrap();

    // Act
    migrate(&pool).await.unwrap();

    // Assert
    let legacy_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pd_executions_legacy")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(legacy_rows, 1);
    let repo = SqliteExecutionRepository::new(pool);
    repo.upsert_execution(&execution("new-1", ExecutionStatus::Success, 10, 0))
        .await
        .unwrap();
    assert_eq!(repo.count_executions().await.unwrap(), 1);
}

// --- executions ---

#[tokio::test]
async fn test_upsert_and_list_round_trip() {
    let repo = SqliteExecutionRepository::new(migrated_pool().await);
    let row = execution("req-1", ExecutionStatus::Success, 250, 0);

    repo.upsert_execution(&row).await.unwrap();

    assert_eq!(repo.list_executions().await.unwrap(), vec![row]);
}

#[tokio::test]
async fn test_upsert_same_id_overwrites_instead_of_duplicating() {
    // Arrange
    let repo = SqliteExecutionRepository::new(migrated_pool().await);
    repo.upsert_execution(&execution("req-1", ExecutionStatus::Success, 250, 0))
        .await
        .unwrap();
    let retried = execution("req-1", ExecutionStatus::Failure, 900, 5);

    // Act
    repo.upsert_execution(&retried).await.unwrap();

    // Assert
    assert_eq!(repo.count_executions().await.unwrap(), 1);
    assert_eq!(repo.list_executions().await.unwrap(), vec![retried]);
}

#[tokio::test]
async fn test_list_orders_by_completion_newest_first() {
    let repo = SqliteExecutionRepository::new(migrated_pool().await);
    for (id, offset) in [("a", 0), ("c", 2), ("b", 1)] {
        repo.upsert_execution(&execution(id, ExecutionStatus::Success, 10, offset))
            .await
            .unwrap();
    }

    let ids: Vec<String> = repo
        .list_executions()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.execution_id)
        .collect();

    assert_eq!(ids, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn test_summary_counts_statuses_and_averages_duration() {
    // Arrange
    let repo = SqliteExecutionRepository::new(migrated_pool().await);
    let rows = [
        execution("a", ExecutionStatus::Success, 100, 0),
        execution("b", ExecutionStatus::Success, 200, 1),
        execution("c", ExecutionStatus::Failure, 300, 2),
    ];
    for row in &rows {
        repo.upsert_execution(row).await.unwrap();
    }

    // Act
    let summary = repo.summarize_executions().await.unwrap();

    // Assert
    assert_eq!(
        summary,
        ExecutionSummary {
            total: 3,
            success_count: 2,
            failure_count: 1,
            average_duration_ms: 200,
        }
    );
}

#[tokio::test]
async fn test_summary_floors_fractional_average() {
    let repo = SqliteExecutionRepository::new(migrated_pool().await);
    repo.upsert_execution(&execution("a", ExecutionStatus::Success, 100, 0))
        .await
        .unwrap();
    repo.upsert_execution(&execution("b", ExecutionStatus::Success, 101, 1))
        .await
        .unwrap();

    let summary = repo.summarize_executions().await.unwrap();

    assert_eq!(summary.average_duration_ms, 100);
}

#[tokio::test]
async fn test_summary_of_empty_table_is_all_zero() {
    let repo = SqliteExecutionRepository::new(migrated_pool().await);

    let summary = repo.summarize_executions().await.unwrap();

    assert_eq!(summary, ExecutionSummary::default());
}

#[tokio::test]
async fn test_queries_fail_with_infrastructure_error_before_migration() {
    let repo = SqliteExecutionRepository::new(memory_pool().await);

    let result = repo.list_executions().await;

    assert!(matches!(
        result,
        Err(interop_core::error::DomainError::Infrastructure(_))
    ));
}

// --- telemetry log ---

#[tokio::test]
async fn test_telemetry_log_preserves_append_order_and_payloads() {
    // Arrange
    let log = SqliteTelemetryLog::new(migrated_pool().await);
    let first = StoredTelemetryEvent {
        event_id: "evt-1".to_owned(),
        event_type: "pd.request.completed".to_owned(),
        occurred_at: base_time(),
        correlation_request_id: Some("req-1".to_owned()),
        payload: json!({ "eventId": "evt-1", "nested": { "k": [1, 2] } }),
    };
    let second = StoredTelemetryEvent {
        event_id: "evt-2".to_owned(),
        event_type: "PD_SEARCH_REQUEST".to_owned(),
        occurred_at: base_time() + TimeDelta::seconds(1),
        correlation_request_id: None,
        payload: json!({ "eventId": "evt-2" }),
    };

    // Act
    log.append(&first).await.unwrap();
    log.append(&second).await.unwrap();
    let loaded = log.load_all().await.unwrap();

    // Assert
    assert_eq!(loaded, vec![first, second]);
}

#[tokio::test]
async fn test_telemetry_log_keeps_corrupt_payload_as_text() {
    let pool = migrated_pool().await;
    sqlx::query(
        "INSERT INTO telemetry_events (event_id, event_type, timestamp_utc, raw_payload) \
         VALUES ('evt-x', 'x', '2026-01-15T10:00:00.000Z', '{not json')",
    )
    .execute(&pool)
    .await
    .unwrap();
    let log = SqliteTelemetryLog::new(pool);

    let loaded = log.load_all().await.unwrap();

    assert_eq!(loaded[0].payload, json!("{not json"));
}
