//! Raster preview generation for stored files and in-memory images.
//!
//! # Responsibility
//! - Produce a small PNG preview when the content supports one.
//! - Collapse every decode/encode failure to "no thumbnail".
//!
//! # Invariants
//! - Thumbnail generation never fails ingestion; the only outcomes are
//!   `Some(png bytes)` or `None`.
//! - Output never exceeds `THUMBNAIL_EDGE` pixels on either edge.

use image::{DynamicImage, ImageFormat};
use log::debug;
use std::io::Cursor;
use std::path::Path;

/// Maximum edge length of a generated preview, in pixels.
pub const THUMBNAIL_EDGE: u32 = 128;

/// Generates a PNG preview for a stored file.
///
/// Returns `None` for content that has no raster representation (plain
/// files, unknown formats) and for any decode failure.
pub fn thumbnail_for_file(path: &Path) -> Option<Vec<u8>> {
    let decoded = match image::open(path) {
        Ok(decoded) => decoded,
        Err(err) => {
            debug!(
                "event=thumbnail_skipped module=thumbnail status=ok source={} reason={err}",
                path.display()
            );
            return None;
        }
    };
    encode_preview(decoded)
}

/// Generates a PNG preview from in-memory encoded image bytes.
pub fn thumbnail_for_image(bytes: &[u8]) -> Option<Vec<u8>> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(decoded) => decoded,
        Err(err) => {
            debug!("event=thumbnail_skipped module=thumbnail status=ok reason={err}");
            return None;
        }
    };
    encode_preview(decoded)
}

fn encode_preview(decoded: DynamicImage) -> Option<Vec<u8>> {
    let preview = decoded.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE);
    let mut buffer = Vec::new();
    match preview.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png) {
        Ok(()) => Some(buffer),
        Err(err) => {
            debug!("event=thumbnail_skipped module=thumbnail status=ok reason={err}");
            None
        }
    }
}
