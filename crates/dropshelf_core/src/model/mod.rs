//! Canonical domain model for shelves and their ingested items.
//!
//! # Responsibility
//! - Define the record shapes owned by the persistence store.
//! - Enforce model-level invariants before any write path touches SQL.
//!
//! # Invariants
//! - Every shelf and item is identified by a stable UUID.
//! - Deleting a shelf hard-deletes its items; there are no orphans.

pub mod item;
pub mod shelf;
