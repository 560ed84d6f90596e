//! InterOps patient-discovery bounded context.
//!
//! Relays PD searches to the integration engine on behalf of callers and
//! records every attempt in the telemetry and timeline stores.

pub mod application;
pub mod domain;
