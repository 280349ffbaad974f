//! Shelf domain model.
//!
//! # Responsibility
//! - Define the canonical shelf record and its creation defaults.
//! - Validate shelf fields before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another shelf.
//! - `color_hex` is always a `#RRGGBB` triplet.
//! - `position_x`/`position_y` are advisory (UI-owned) but must round-trip
//!   through persistence unchanged.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a shelf.
pub type ShelfId = Uuid;

/// Display name assigned to freshly created shelves.
pub const DEFAULT_SHELF_NAME: &str = "New Shelf";

/// Accent color assigned to freshly created shelves.
pub const DEFAULT_SHELF_COLOR: &str = "#4A90D9";

/// Validation failures for shelf and item records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `color_hex` is not a `#RRGGBB` triplet.
    InvalidColorHex(String),
    /// Item kind requires a stored payload but `payload_path` is absent.
    MissingPayloadPath(&'static str),
    /// Item kind carries its content inline but `payload_path` is set.
    UnexpectedPayloadPath(&'static str),
    /// `file_size` is negative.
    NegativeFileSize(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidColorHex(value) => {
                write!(f, "invalid accent color `{value}`; expected `#RRGGBB`")
            }
            Self::MissingPayloadPath(kind) => {
                write!(f, "item kind `{kind}` requires a payload path")
            }
            Self::UnexpectedPayloadPath(kind) => {
                write!(f, "item kind `{kind}` must not carry a payload path")
            }
            Self::NegativeFileSize(size) => write!(f, "negative item size {size}"),
        }
    }
}

impl Error for ValidationError {}

/// Canonical shelf record.
///
/// Items are not embedded; they are fetched separately in insertion order so
/// UI snapshots and the canonical record never share mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    /// Stable global ID; immutable for the shelf lifetime.
    pub id: ShelfId,
    /// User-facing shelf title.
    pub name: String,
    /// Accent color as a `#RRGGBB` hex triplet.
    pub color_hex: String,
    /// Creation time in unix epoch milliseconds.
    pub created_at: i64,
    /// Pinned shelves survive surface close and are restored at next launch.
    pub is_pinned: bool,
    /// Collapsed display state; advisory, UI-owned.
    pub is_collapsed: bool,
    /// Screen position, advisory. Must round-trip exactly.
    pub position_x: f32,
    /// Screen position, advisory. Must round-trip exactly.
    pub position_y: f32,
}

impl Shelf {
    /// Creates a shelf with a fresh ID and configured defaults at `(x, y)`.
    pub fn at_position(x: f32, y: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: DEFAULT_SHELF_NAME.to_string(),
            color_hex: DEFAULT_SHELF_COLOR.to_string(),
            created_at: Utc::now().timestamp_millis(),
            is_pinned: false,
            is_collapsed: false,
            position_x: x,
            position_y: y,
        }
    }

    /// Checks model invariants; called on every write path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_color_hex(&self.color_hex)
    }
}

pub(crate) fn validate_color_hex(value: &str) -> Result<(), ValidationError> {
    let digits = value
        .strip_prefix('#')
        .ok_or_else(|| ValidationError::InvalidColorHex(value.to_string()))?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidColorHex(value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Shelf, ValidationError, DEFAULT_SHELF_COLOR, DEFAULT_SHELF_NAME};

    #[test]
    fn new_shelf_uses_defaults() {
        let shelf = Shelf::at_position(100.0, 100.0);
        assert_eq!(shelf.name, DEFAULT_SHELF_NAME);
        assert_eq!(shelf.color_hex, DEFAULT_SHELF_COLOR);
        assert!(!shelf.is_pinned);
        assert!(!shelf.is_collapsed);
        assert!(shelf.validate().is_ok());
    }

    #[test]
    fn validate_rejects_malformed_color() {
        let mut shelf = Shelf::at_position(0.0, 0.0);
        shelf.color_hex = "4A90D9".to_string();
        assert!(matches!(
            shelf.validate(),
            Err(ValidationError::InvalidColorHex(_))
        ));

        shelf.color_hex = "#4A90".to_string();
        assert!(shelf.validate().is_err());

        shelf.color_hex = "#4A90ZZ".to_string();
        assert!(shelf.validate().is_err());
    }
}
