//! Liveness endpoint, mounted outside the API prefix.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "interop-telemetry";

#[derive(Debug, Serialize)]
struct Liveness {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /health`. Touches no storage or upstream.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}
