//! Domain layer for the timeline context.

pub mod entry;
pub mod patient_key;
