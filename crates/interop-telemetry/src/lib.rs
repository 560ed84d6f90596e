//! InterOps telemetry bounded context.
//!
//! Accepts structured events from the integration engine and the EHR
//! platform, keeps them in an append-only store, and derives normalized
//! patient-discovery execution records from them.

pub mod application;
pub mod domain;
pub mod store;
