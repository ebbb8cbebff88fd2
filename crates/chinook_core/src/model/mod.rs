//! Catalog domain model.
//!
//! # Responsibility
//! - Define the album/artist records exchanged between repositories, the
//!   catalog service and the CLI.
//!
//! # Invariants
//! - Identifiers are store-assigned positive integers.
//! - Records are snapshots; nothing here is cached between operations.

pub mod album;
pub mod artist;
