//! Drag/paste payload abstraction.
//!
//! # Responsibility
//! - Describe every representation a payload may advertise, decoupled from
//!   any platform pasteboard object.
//! - Define the asynchronous promised-file contract.
//!
//! # Invariants
//! - A promised file delivers exactly once: a path or a failure.
//! - There is no cancellation; a consumer that no longer cares ignores the
//!   delivery instead of un-registering it.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Failure reported by a promised-file delivery mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromiseError {
    reason: String,
}

impl PromiseError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Display for PromiseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "promised file delivery failed: {}", self.reason)
    }
}

impl Error for PromiseError {}

/// Outcome of one promised-file delivery.
pub type DeliveryResult = Result<PathBuf, PromiseError>;

/// Completion callback handed to a promised file at registration.
pub type DeliveryCallback = Box<dyn FnOnce(DeliveryResult) + Send + 'static>;

/// A drag source that advertises a file whose bytes arrive later.
///
/// Registration returns immediately; the callback runs on an arbitrary later
/// turn, exactly once, when delivery succeeds or fails.
pub trait PromisedFile: Send + 'static {
    /// Registers interest in the eventual delivery.
    fn register(self: Box<Self>, on_delivery: DeliveryCallback);
}

/// One clipboard/drag payload with every representation it advertises.
///
/// External drop targets and paste handlers translate their platform
/// pasteboard into this shape; the resolver only reads it.
#[derive(Default)]
pub struct DragPayload {
    /// Local filesystem paths (priority 1).
    pub file_paths: Vec<PathBuf>,
    /// Promised files delivered asynchronously (priority 2).
    pub promised_files: Vec<Box<dyn PromisedFile>>,
    /// In-memory encoded images (priority 3).
    pub images: Vec<Vec<u8>>,
    /// Non-file URLs (priority 4).
    pub links: Vec<String>,
    /// Plain text (priority 5).
    pub text: Option<String>,
}

impl DragPayload {
    /// Whether the payload advertises no representation at all.
    pub fn is_empty(&self) -> bool {
        self.file_paths.is_empty()
            && self.promised_files.is_empty()
            && self.images.is_empty()
            && self.links.is_empty()
            && self.text.is_none()
    }
}
