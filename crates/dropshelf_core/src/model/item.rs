//! Shelf item domain model.
//!
//! # Responsibility
//! - Define one normalized unit of ingested content.
//! - Validate the payload-path/kind pairing before persistence.
//!
//! # Invariants
//! - File-like kinds (`file`, `image`, `deferred_file`) always reference a
//!   stored payload; inline kinds (`web_link`, `text`) never do.
//! - An item's owning shelf is referential state in the store, not part of
//!   the value; `ShelfStore::add_item` binds the two.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shelf::ValidationError;

/// Stable identifier for a shelf item.
pub type ItemId = Uuid;

/// Content category of an ingested item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Local file copied into the content store.
    File,
    /// In-memory image persisted as PNG.
    Image,
    /// Non-file URL; the link itself is the content.
    WebLink,
    /// Plain text carried verbatim in `display_name`.
    Text,
    /// File whose bytes arrived through an asynchronous promise delivery.
    DeferredFile,
}

impl ItemKind {
    /// Whether this kind stores its bytes in the content store.
    pub fn has_payload(self) -> bool {
        matches!(self, Self::File | Self::Image | Self::DeferredFile)
    }

    pub(crate) fn as_db_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Image => "image",
            Self::WebLink => "web_link",
            Self::Text => "text",
            Self::DeferredFile => "deferred_file",
        }
    }

    pub(crate) fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "file" => Some(Self::File),
            "image" => Some(Self::Image),
            "web_link" => Some(Self::WebLink),
            "text" => Some(Self::Text),
            "deferred_file" => Some(Self::DeferredFile),
            _ => None,
        }
    }
}

/// Canonical record for one ingested unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfItem {
    /// Stable global ID.
    pub id: ItemId,
    /// File base name, URL, or verbatim text depending on `kind`.
    pub display_name: String,
    /// Content category.
    pub kind: ItemKind,
    /// Path relative to the content store payload root, for file-like kinds.
    pub payload_path: Option<String>,
    /// Path relative to the thumbnail root; absent when no preview exists.
    pub thumbnail_path: Option<String>,
    /// Payload size in bytes; UTF-8 length for inline kinds.
    pub file_size: i64,
}

impl ShelfItem {
    /// Creates an item with a fresh ID and no stored payload or thumbnail.
    pub fn new(kind: ItemKind, display_name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), kind, display_name)
    }

    /// Creates an item with a caller-provided stable ID.
    pub fn with_id(id: ItemId, kind: ItemKind, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            kind,
            payload_path: None,
            thumbnail_path: None,
            file_size: 0,
        }
    }

    /// Checks model invariants; called on every write path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.kind.has_payload() && self.payload_path.is_none() {
            return Err(ValidationError::MissingPayloadPath(self.kind.as_db_str()));
        }
        if !self.kind.has_payload() && self.payload_path.is_some() {
            return Err(ValidationError::UnexpectedPayloadPath(self.kind.as_db_str()));
        }
        if self.file_size < 0 {
            return Err(ValidationError::NegativeFileSize(self.file_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemKind, ShelfItem};
    use crate::model::shelf::ValidationError;

    #[test]
    fn file_kinds_require_payload_path() {
        for kind in [ItemKind::File, ItemKind::Image, ItemKind::DeferredFile] {
            let item = ShelfItem::new(kind, "name");
            assert!(matches!(
                item.validate(),
                Err(ValidationError::MissingPayloadPath(_))
            ));
        }

        let mut item = ShelfItem::new(ItemKind::File, "report.pdf");
        item.payload_path = Some("report.pdf".to_string());
        assert!(item.validate().is_ok());
    }

    #[test]
    fn inline_kinds_reject_payload_path() {
        let mut item = ShelfItem::new(ItemKind::Text, "scratch note");
        assert!(item.validate().is_ok());

        item.payload_path = Some("stray.bin".to_string());
        assert!(matches!(
            item.validate(),
            Err(ValidationError::UnexpectedPayloadPath(_))
        ));
    }

    #[test]
    fn kind_db_names_roundtrip() {
        for kind in [
            ItemKind::File,
            ItemKind::Image,
            ItemKind::WebLink,
            ItemKind::Text,
            ItemKind::DeferredFile,
        ] {
            assert_eq!(ItemKind::from_db_str(kind.as_db_str()), Some(kind));
        }
        assert_eq!(ItemKind::from_db_str("folder"), None);
    }
}
