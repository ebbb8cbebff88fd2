//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the use cases the CLI exposes.
//! - Keep presentation code decoupled from SQL and gateway details.

pub mod catalog_service;
