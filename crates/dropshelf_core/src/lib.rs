//! Core ingestion and persistence logic for DropShelf.
//! This crate is the single source of truth for shelf/item invariants.

pub mod content;
pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;
pub mod thumbnail;

pub use content::{ContentError, ContentResult, ContentStore};
pub use ingest::payload::{
    DeliveryCallback, DeliveryResult, DragPayload, PromiseError, PromisedFile,
};
pub use ingest::promise::{promised_file, ChannelPromise, DeliveryTicket};
pub use ingest::resolver::{
    DeferredSink, ResolveError, ResolveOutcome, ResolveResult, SourceResolver,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{ItemId, ItemKind, ShelfItem};
pub use model::shelf::{Shelf, ShelfId, ValidationError};
pub use store::{ShelfStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
