//! Application layer for the timeline context.

pub mod command_handlers;
pub mod query_handlers;
