//! Source resolver: payload to persisted items.
//!
//! # Responsibility
//! - Apply the strict short-circuiting priority across representations:
//!   files, promised files, images, web links, text.
//! - Run per-kind processing and write accepted items into the store.
//!
//! # Invariants
//! - Lower tiers run only when priorities above them produced nothing;
//!   promised-file registrations count as produced.
//! - Each file in a payload is processed independently; one failure never
//!   aborts its siblings.
//! - Thumbnail failures are absorbed; previews are optional.

use crate::content::{ContentError, ContentStore};
use crate::ingest::payload::DragPayload;
use crate::model::item::{ItemId, ItemKind, ShelfItem};
use crate::model::shelf::{Shelf, ShelfId};
use crate::store::{ShelfStore, StoreError};
use crate::thumbnail;
use chrono::Local;
use image::ImageFormat;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Per-item ingestion failures.
#[derive(Debug)]
pub enum ResolveError {
    /// Input path or bytes cannot be read.
    UnreadableSource(String),
    /// Copying or writing into durable storage failed.
    StorageWriteFailed(String),
    /// Image bytes could not be decoded or re-encoded.
    UnsupportedEncoding(String),
    /// The persistence store rejected the resulting item.
    Store(StoreError),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnreadableSource(detail) => write!(f, "source is unreadable: {detail}"),
            Self::StorageWriteFailed(detail) => write!(f, "storage write failed: {detail}"),
            Self::UnsupportedEncoding(detail) => {
                write!(f, "image conversion failed: {detail}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContentError> for ResolveError {
    fn from(value: ContentError) -> Self {
        match value {
            ContentError::UnreadableSource { .. } => Self::UnreadableSource(value.to_string()),
            ContentError::StorageWriteFailed { .. } | ContentError::NoDataDirectory => {
                Self::StorageWriteFailed(value.to_string())
            }
        }
    }
}

impl From<StoreError> for ResolveError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Receives deferred-file outcomes on an arbitrary later turn.
///
/// Every registered promise emits exactly one call: the persisted item or
/// the failure that prevented it.
pub type DeferredSink = Arc<dyn Fn(ResolveResult<ShelfItem>) + Send + Sync + 'static>;

/// What one `resolve` call produced synchronously.
#[derive(Debug, Default)]
pub struct ResolveOutcome {
    /// Items accepted and persisted, in processing order.
    pub items: Vec<ShelfItem>,
    /// Per-item failures collected alongside the successes.
    pub failures: Vec<ResolveError>,
    /// Number of promised files registered; their items arrive later.
    pub deferred: usize,
}

/// Converts clipboard/drag payloads into persisted shelf items.
///
/// Holds its collaborators by handle; constructed once at process start and
/// shared with every drop target and paste handler.
pub struct SourceResolver {
    store: Arc<ShelfStore>,
    content: Arc<ContentStore>,
}

impl SourceResolver {
    pub fn new(store: Arc<ShelfStore>, content: Arc<ContentStore>) -> Self {
        Self { store, content }
    }

    /// Resolves one payload into items for `shelf_id`.
    ///
    /// Synchronous tiers return through `ResolveOutcome`; promised files
    /// report through `on_deferred` when their bytes arrive.
    pub fn resolve(
        &self,
        payload: DragPayload,
        shelf_id: ShelfId,
        on_deferred: DeferredSink,
    ) -> ResolveOutcome {
        let mut outcome = ResolveOutcome::default();

        // Priority 1: local file paths, each processed independently.
        for path in &payload.file_paths {
            match ingest_file_at(&self.content, &self.store, path, shelf_id, ItemKind::File) {
                Ok(item) => outcome.items.push(item),
                Err(err) => {
                    warn!(
                        "event=file_ingest module=ingest status=error source={} error={err}",
                        path.display()
                    );
                    outcome.failures.push(err);
                }
            }
        }

        // Priority 2: promised files; registration counts as produced.
        outcome.deferred = payload.promised_files.len();
        for promise in payload.promised_files {
            let store = Arc::clone(&self.store);
            let content = Arc::clone(&self.content);
            let sink = Arc::clone(&on_deferred);
            promise.register(Box::new(move |delivery| {
                let result = match delivery {
                    Ok(path) => ingest_file_at(
                        &content,
                        &store,
                        &path,
                        shelf_id,
                        ItemKind::DeferredFile,
                    ),
                    Err(err) => Err(ResolveError::UnreadableSource(err.to_string())),
                };
                match &result {
                    Ok(item) => info!(
                        "event=deferred_delivered module=ingest status=ok item={} shelf={shelf_id}",
                        item.id
                    ),
                    Err(err) => warn!(
                        "event=deferred_delivered module=ingest status=error shelf={shelf_id} error={err}"
                    ),
                }
                sink(result);
            }));
        }

        // Priority 3: in-memory images.
        if outcome.items.is_empty() && outcome.deferred == 0 {
            for bytes in &payload.images {
                match self.ingest_image(bytes, shelf_id) {
                    Ok(item) => outcome.items.push(item),
                    Err(err) => outcome.failures.push(err),
                }
            }
        }

        // Priority 4: web links.
        if outcome.items.is_empty() && outcome.deferred == 0 {
            for link in &payload.links {
                match self.ingest_inline(ItemKind::WebLink, link, shelf_id) {
                    Ok(item) => outcome.items.push(item),
                    Err(err) => outcome.failures.push(err),
                }
            }
        }

        // Priority 5: plain text.
        if outcome.items.is_empty() && outcome.deferred == 0 {
            if let Some(text) = &payload.text {
                match self.ingest_inline(ItemKind::Text, text, shelf_id) {
                    Ok(item) => outcome.items.push(item),
                    Err(err) => outcome.failures.push(err),
                }
            }
        }

        info!(
            "event=payload_resolved module=ingest status=ok shelf={shelf_id} items={} failures={} deferred={}",
            outcome.items.len(),
            outcome.failures.len(),
            outcome.deferred
        );
        outcome
    }

    /// Ingests exactly one local file; used for launch-argument paths.
    pub fn resolve_single_file(
        &self,
        path: &Path,
        shelf_id: ShelfId,
    ) -> ResolveResult<ShelfItem> {
        ingest_file_at(&self.content, &self.store, path, shelf_id, ItemKind::File)
    }

    /// Creates a shelf named after the first file and ingests every path.
    ///
    /// Per-file failures are collected; the shelf is created regardless.
    pub fn assemble_shelf(
        &self,
        paths: &[PathBuf],
        x: f32,
        y: f32,
    ) -> ResolveResult<(Shelf, ResolveOutcome)> {
        let mut shelf = self.store.create_shelf(x, y)?;
        if let Some(stem) = paths.first().and_then(|path| path.file_stem()) {
            shelf.name = stem.to_string_lossy().into_owned();
            self.store.update_shelf(&shelf)?;
        }

        let mut outcome = ResolveOutcome::default();
        for path in paths {
            match self.resolve_single_file(path, shelf.id) {
                Ok(item) => outcome.items.push(item),
                Err(err) => outcome.failures.push(err),
            }
        }
        Ok((shelf, outcome))
    }

    fn ingest_image(&self, bytes: &[u8], shelf_id: ShelfId) -> ResolveResult<ShelfItem> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|err| ResolveError::UnsupportedEncoding(err.to_string()))?;
        let mut png = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|err| ResolveError::UnsupportedEncoding(err.to_string()))?;

        let item_id = Uuid::new_v4();
        let relative = self
            .content
            .write_payload(&png, &format!("{item_id}.png"))?;

        let display_name = format!("Image {}", Local::now().format("%Y-%m-%d %H.%M.%S"));
        let mut item = ShelfItem::with_id(item_id, ItemKind::Image, display_name);
        item.payload_path = Some(relative.clone());
        item.thumbnail_path =
            store_thumbnail(&self.content, thumbnail::thumbnail_for_image(&png), item_id);
        item.file_size = self.content.size_of(&relative) as i64;

        self.store.add_item(&item, shelf_id)?;
        Ok(item)
    }

    fn ingest_inline(
        &self,
        kind: ItemKind,
        content: &str,
        shelf_id: ShelfId,
    ) -> ResolveResult<ShelfItem> {
        let mut item = ShelfItem::new(kind, content);
        item.file_size = content.len() as i64;
        self.store.add_item(&item, shelf_id)?;
        Ok(item)
    }
}

/// The shared file branch: copy, thumbnail (best-effort), size, persist.
fn ingest_file_at(
    content: &ContentStore,
    store: &ShelfStore,
    source: &Path,
    shelf_id: ShelfId,
    kind: ItemKind,
) -> ResolveResult<ShelfItem> {
    let relative = content.copy_into_storage(source)?;

    let display_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| relative.clone());
    let mut item = ShelfItem::new(kind, display_name);
    item.payload_path = Some(relative.clone());
    item.thumbnail_path = store_thumbnail(
        content,
        thumbnail::thumbnail_for_file(&content.resolve_payload(&relative)),
        item.id,
    );
    item.file_size = content.size_of(&relative) as i64;

    store.add_item(&item, shelf_id)?;
    Ok(item)
}

fn store_thumbnail(
    content: &ContentStore,
    bytes: Option<Vec<u8>>,
    item_id: ItemId,
) -> Option<String> {
    let bytes = bytes?;
    match content.write_thumbnail(&bytes, &item_id.to_string()) {
        Ok(relative) => Some(relative),
        Err(err) => {
            // Previews are optional; a failed write must not fail ingestion.
            warn!("event=thumbnail_write module=ingest status=error item={item_id} error={err}");
            None
        }
    }
}
