//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use interop_core::clock::Clock;
use interop_core::upstream::{AccessTokenProvider, PdGateway};
use interop_store::{SqliteExecutionRepository, SqliteTelemetryLog, migrate};
use interop_test_support::{FixedClock, RecordingPdGateway, StaticTokenProvider};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use interop_api::routes;
use interop_api::state::AppState;

/// Prefix used by the integration tests, matching the default config.
pub const API_PREFIX: &str = "/api";

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// A migrated single-connection in-memory database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}

/// Application state over real `SQLite` repositories and stub upstreams.
pub fn build_test_state(pool: SqlitePool) -> AppState {
    build_test_state_with(
        pool,
        Arc::new(StaticTokenProvider("tok".into())),
        Arc::new(RecordingPdGateway::default()),
    )
}

/// Application state with caller-chosen upstream doubles.
pub fn build_test_state_with(
    pool: SqlitePool,
    token_provider: Arc<dyn AccessTokenProvider>,
    pd_gateway: Arc<dyn PdGateway>,
) -> AppState {
    AppState::new(
        fixed_clock(),
        Arc::new(SqliteTelemetryLog::new(pool.clone())),
        Arc::new(SqliteExecutionRepository::new(pool)),
        token_provider,
        pd_gateway,
    )
}

/// Build the full app router, with the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    routes::build_router(state, API_PREFIX)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
