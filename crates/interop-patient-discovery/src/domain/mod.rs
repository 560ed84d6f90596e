//! Domain layer for the patient-discovery context.

pub mod commands;
