//! InterOps timeline bounded context.
//!
//! Keeps an ordered, append-only log of events per patient, keyed by a
//! normalized name and date-of-birth identity.

pub mod application;
pub mod domain;
pub mod store;
