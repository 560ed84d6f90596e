//! Shared test doubles for the InterOps telemetry service.

mod clock;
mod repository;
mod upstream;

pub use clock::FixedClock;
pub use repository::{
    FailingExecutionRepository, FailingTelemetryLog, InMemoryExecutionRepository,
    InMemoryTelemetryLog,
};
pub use upstream::{FailingPdGateway, FailingTokenProvider, RecordingPdGateway, StaticTokenProvider};
