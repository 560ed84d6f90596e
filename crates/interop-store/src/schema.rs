//! Database schema and migration.

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, warn};

use crate::error::StoreError;

/// SQL to create the materialized executions table.
pub const CREATE_PD_EXECUTIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS pd_executions (
    execution_id  TEXT PRIMARY KEY,
    started_at    TEXT NOT NULL,
    completed_at  TEXT NOT NULL,
    duration_ms   INTEGER NOT NULL,
    status        TEXT NOT NULL,
    request_count INTEGER NOT NULL DEFAULT 1
)";

/// Index backing the newest-first listing.
pub const CREATE_PD_EXECUTIONS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_pd_executions_completed_at
    ON pd_executions (completed_at)";

/// SQL to create the raw telemetry log.
pub const CREATE_TELEMETRY_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS telemetry_events (
    seq                    INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id               TEXT NOT NULL,
    event_type             TEXT NOT NULL,
    timestamp_utc          TEXT NOT NULL,
    correlation_request_id TEXT,
    raw_payload            TEXT NOT NULL,
    received_at            TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

/// Index for correlation lookups.
pub const CREATE_TELEMETRY_EVENTS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_telemetry_events_correlation
    ON telemetry_events (correlation_request_id)";

const LEGACY_EXECUTIONS_TABLE: &str = "pd_executions_legacy";

/// Opens a connection pool, creating the database file if the URL asks for it.
///
/// # Errors
///
/// Returns `StoreError::Database` if the pool cannot connect.
pub async fn connect(database_url: &str) -> Result<SqlitePool, StoreError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Brings the schema up to date. Safe to run on every start.
///
/// # Errors
///
/// Returns `StoreError` if a statement fails or a legacy table cannot be
/// moved aside.
pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    retire_legacy_executions_table(pool).await?;
    for statement in [
        CREATE_PD_EXECUTIONS_TABLE,
        CREATE_PD_EXECUTIONS_INDEX,
        CREATE_TELEMETRY_EVENTS_TABLE,
        CREATE_TELEMETRY_EVENTS_INDEX,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("database schema is up to date");
    Ok(())
}

// Older deployments keyed pd_executions by request_id.
async fn retire_legacy_executions_table(pool: &SqlitePool) -> Result<(), StoreError> {
    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('pd_executions')")
            .fetch_all(pool)
            .await?;
    let is_legacy = columns.iter().any(|c| c == "request_id")
        && !columns.iter().any(|c| c == "execution_id");
    if !is_legacy {
        return Ok(());
    }

    let legacy_exists: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(LEGACY_EXECUTIONS_TABLE)
            .fetch_one(pool)
            .await?;
    if legacy_exists > 0 {
        return Err(StoreError::Migration(format!(
            "pd_executions uses the request_id layout but {LEGACY_EXECUTIONS_TABLE} already exists"
        )));
    }

    warn!(
        renamed_to = LEGACY_EXECUTIONS_TABLE,
        "moving legacy pd_executions table aside"
    );
    sqlx::query("ALTER TABLE pd_executions RENAME TO pd_executions_legacy")
        .execute(pool)
        .await?;
    Ok(())
}
