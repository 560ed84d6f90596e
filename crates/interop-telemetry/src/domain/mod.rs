//! Domain layer for the telemetry context.

pub mod events;
pub mod materializer;
pub mod validator;
