//! Errors raised while opening or migrating the database.

/// Startup-time storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The driver failed to connect or run a statement.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The existing schema could not be brought up to date.
    #[error("migration error: {0}")]
    Migration(String),
}
