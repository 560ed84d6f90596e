//! InterOps telemetry API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use interop_api::config::AppConfig;
use interop_api::error::AppError;
use interop_api::observability;
use interop_api::routes;
use interop_api::state::AppState;
use interop_core::clock::{Clock, SystemClock};
use interop_store::{SqliteExecutionRepository, SqliteTelemetryLog};
use interop_telemetry::application::command_handlers::handle_restore_from_log;
use interop_upstream::{MirthPdGateway, OpenEmrTokenManager};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let tracing_guard = observability::init(config.otlp_endpoint.as_deref())?;

    let result = run(config).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "server exited with error");
    }
    tracing_guard.shutdown();
    result
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        api_prefix = %config.api_prefix,
        pd_endpoint_configured = config.pd_endpoint_url.is_some(),
        "Starting InterOps telemetry API server"
    );

    // Storage.
    let pool = interop_store::connect(&config.database_url).await?;
    interop_store::migrate(&pool).await?;

    // Upstream clients.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let token_provider = OpenEmrTokenManager::new(
        config.openemr.clone(),
        config.upstream_timeout,
        Arc::clone(&clock),
    )?;
    let pd_gateway = MirthPdGateway::new(config.pd_endpoint_url.clone(), config.upstream_timeout)?;

    // Build application state and reload telemetry persisted by earlier runs.
    let app_state = AppState::new(
        clock,
        Arc::new(SqliteTelemetryLog::new(pool.clone())),
        Arc::new(SqliteExecutionRepository::new(pool)),
        Arc::new(token_provider),
        Arc::new(pd_gateway),
    );
    let restored =
        handle_restore_from_log(&app_state.telemetry_store, app_state.telemetry_log.as_ref())
            .await;
    if restored.is_degraded() {
        tracing::warn!("telemetry log unavailable, starting with an empty telemetry store");
    }

    // Build router.
    let app = routes::build_router(app_state, &config.api_prefix)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins)?);

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, AppError> {
    if allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| AppError::Config(format!("invalid CORS origin {origin:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
}
