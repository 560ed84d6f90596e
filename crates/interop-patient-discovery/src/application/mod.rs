//! Application layer for the patient-discovery context.

pub mod command_handlers;
