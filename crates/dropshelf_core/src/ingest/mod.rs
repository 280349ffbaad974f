//! Ingestion pipeline: payload abstraction and source resolution.
//!
//! # Responsibility
//! - Normalize clipboard/drag payloads into persisted shelf items.
//! - Apply the strict source-priority policy across representations.
//!
//! # Invariants
//! - One drop/paste gesture never yields duplicate items for equivalent
//!   representations; only the highest-fidelity tier is accepted.
//! - Per-item failures never discard sibling items from the same payload.

pub mod payload;
pub mod promise;
pub mod resolver;
