//! InterOps Core: shared domain abstractions.
//!
//! This crate defines the types and traits that every bounded context
//! depends on: the clock, the error taxonomy, the materialized execution
//! record, and the seams to persistence and upstream collaborators. It
//! contains no infrastructure code.

pub mod clock;
pub mod degrade;
pub mod error;
pub mod execution;
pub mod repository;
pub mod timestamp;
pub mod upstream;
