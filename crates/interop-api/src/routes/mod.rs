//! HTTP route modules, one per bounded context.

pub mod health;
pub mod pd;
pub mod pd_executions;
pub mod telemetry;
pub mod timeline;
pub mod tokens;

use axum::Router;

use crate::state::AppState;

/// Every router served under the API prefix.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(telemetry::router())
        .merge(pd_executions::router())
        .merge(timeline::router())
        .merge(pd::router())
        .merge(tokens::router())
}

/// Builds the full application router: `/health` at the root and everything
/// else under `api_prefix` (an empty prefix mounts at the root).
pub fn build_router(state: AppState, api_prefix: &str) -> Router {
    let api = if api_prefix.is_empty() {
        api_router()
    } else {
        Router::new().nest(api_prefix, api_router())
    };
    Router::new()
        .merge(health::router())
        .merge(api)
        .with_state(state)
}
