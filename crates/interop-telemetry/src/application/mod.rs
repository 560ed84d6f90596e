//! Application layer for the telemetry context.

pub mod command_handlers;
pub mod query_handlers;
