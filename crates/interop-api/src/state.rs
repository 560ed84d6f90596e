//! Shared application state.

use std::sync::Arc;

use interop_core::clock::Clock;
use interop_core::repository::{ExecutionRepository, TelemetryLog};
use interop_core::upstream::{AccessTokenProvider, PdGateway};
use interop_patient_discovery::application::command_handlers::PdSearchContext;
use interop_telemetry::store::TelemetryStore;
use interop_timeline::store::TimelineStore;

/// Application state shared across all request handlers.
///
/// The stores are created once at startup and injected here; there are no
/// process-wide globals.
#[derive(Clone)]
pub struct AppState {
    /// Clock for handler timestamps.
    pub clock: Arc<dyn Clock>,
    /// Validated telemetry events in arrival order.
    pub telemetry_store: Arc<TelemetryStore>,
    /// Durable raw telemetry log.
    pub telemetry_log: Arc<dyn TelemetryLog>,
    /// Materialized PD executions.
    pub execution_repository: Arc<dyn ExecutionRepository>,
    /// Per-patient timelines.
    pub timeline_store: Arc<TimelineStore>,
    /// `OpenEMR` access tokens.
    pub token_provider: Arc<dyn AccessTokenProvider>,
    /// Integration-engine PD endpoint.
    pub pd_gateway: Arc<dyn PdGateway>,
}

impl AppState {
    /// Create new application state with empty in-memory stores.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        telemetry_log: Arc<dyn TelemetryLog>,
        execution_repository: Arc<dyn ExecutionRepository>,
        token_provider: Arc<dyn AccessTokenProvider>,
        pd_gateway: Arc<dyn PdGateway>,
    ) -> Self {
        Self {
            clock,
            telemetry_store: Arc::new(TelemetryStore::new()),
            telemetry_log,
            execution_repository,
            timeline_store: Arc::new(TimelineStore::new()),
            token_provider,
            pd_gateway,
        }
    }

    /// Borrows the collaborators a PD search needs.
    #[must_use]
    pub fn pd_search_context(&self) -> PdSearchContext<'_> {
        PdSearchContext {
            clock: self.clock.as_ref(),
            tokens: self.token_provider.as_ref(),
            gateway: self.pd_gateway.as_ref(),
            telemetry_store: &self.telemetry_store,
            telemetry_log: self.telemetry_log.as_ref(),
            timeline_store: &self.timeline_store,
        }
    }
}
