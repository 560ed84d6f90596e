//! InterOps telemetry HTTP API.
//!
//! The binary in `main.rs` wires configuration, storage, and upstream
//! clients into [`state::AppState`] and serves [`routes::build_router`].

pub mod config;
pub mod error;
pub mod observability;
pub mod routes;
pub mod state;
