//! Durable byte storage for item payloads and thumbnails.
//!
//! # Responsibility
//! - Own the payload root and thumbnail root directories.
//! - Copy or write payload bytes without ever overwriting an existing file.
//! - Resolve relative payload paths for export collaborators.
//!
//! # Invariants
//! - Roots are created lazily on first write and are stable across launches.
//! - Payload names keep the original base name; collisions get a fresh UUID
//!   suffix on the stem.
//! - Thumbnails are keyed by identifier and may be overwritten (idempotent).

use directories::ProjectDirs;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const PAYLOAD_DIR_NAME: &str = "storage";
const THUMBNAIL_DIR_NAME: &str = "thumbnails";

pub type ContentResult<T> = Result<T, ContentError>;

/// Errors from content store operations.
#[derive(Debug)]
pub enum ContentError {
    /// Source path cannot be read or is not a regular file.
    UnreadableSource { path: PathBuf, source: io::Error },
    /// Destination write failed (disk full, permissions, path length).
    StorageWriteFailed { path: PathBuf, source: io::Error },
    /// No per-user data directory is available on this system.
    NoDataDirectory,
}

impl Display for ContentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnreadableSource { path, source } => {
                write!(f, "cannot read source `{}`: {source}", path.display())
            }
            Self::StorageWriteFailed { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
            Self::NoDataDirectory => {
                write!(f, "no per-user data directory available on this system")
            }
        }
    }
}

impl Error for ContentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnreadableSource { source, .. } => Some(source),
            Self::StorageWriteFailed { source, .. } => Some(source),
            Self::NoDataDirectory => None,
        }
    }
}

/// Durable byte storage rooted at two sibling directories.
pub struct ContentStore {
    payload_root: PathBuf,
    thumbnail_root: PathBuf,
}

impl ContentStore {
    /// Creates a store over explicit roots. Directories are created lazily.
    pub fn new(payload_root: impl Into<PathBuf>, thumbnail_root: impl Into<PathBuf>) -> Self {
        Self {
            payload_root: payload_root.into(),
            thumbnail_root: thumbnail_root.into(),
        }
    }

    /// Creates a store under the application-private per-user data location.
    ///
    /// The location is deterministic, so payload paths recorded in the
    /// database resolve identically on every launch.
    pub fn at_default_location() -> ContentResult<Self> {
        let dirs =
            ProjectDirs::from("", "", "dropshelf").ok_or(ContentError::NoDataDirectory)?;
        let data_dir = dirs.data_dir();
        Ok(Self::new(
            data_dir.join(PAYLOAD_DIR_NAME),
            data_dir.join(THUMBNAIL_DIR_NAME),
        ))
    }

    /// Copies an external file into the payload root.
    ///
    /// Returns the stored path relative to the payload root. A name collision
    /// never overwrites; the stem gets a fresh UUID suffix instead.
    pub fn copy_into_storage(&self, source: &Path) -> ContentResult<String> {
        let metadata = fs::metadata(source).map_err(|err| ContentError::UnreadableSource {
            path: source.to_path_buf(),
            source: err,
        })?;
        if !metadata.is_file() {
            return Err(ContentError::UnreadableSource {
                path: source.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        self.ensure_dir(&self.payload_root)?;
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let relative = self.vacant_payload_name(&file_name);
        let destination = self.payload_root.join(&relative);

        fs::copy(source, &destination).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound || err.kind() == io::ErrorKind::PermissionDenied
            {
                ContentError::UnreadableSource {
                    path: source.to_path_buf(),
                    source: err,
                }
            } else {
                ContentError::StorageWriteFailed {
                    path: destination.clone(),
                    source: err,
                }
            }
        })?;

        info!(
            "event=payload_copied module=content status=ok source={} stored={relative}",
            source.display()
        );
        Ok(relative)
    }

    /// Writes in-memory payload bytes under the payload root.
    ///
    /// Same collision policy as [`copy_into_storage`](Self::copy_into_storage).
    pub fn write_payload(&self, bytes: &[u8], preferred_name: &str) -> ContentResult<String> {
        self.ensure_dir(&self.payload_root)?;
        let relative = self.vacant_payload_name(preferred_name);
        let destination = self.payload_root.join(&relative);
        fs::write(&destination, bytes).map_err(|err| ContentError::StorageWriteFailed {
            path: destination.clone(),
            source: err,
        })?;
        info!(
            "event=payload_written module=content status=ok stored={relative} bytes={}",
            bytes.len()
        );
        Ok(relative)
    }

    /// Writes encoded thumbnail bytes keyed by `identifier`.
    ///
    /// Overwriting an existing thumbnail for the same identifier is allowed.
    pub fn write_thumbnail(&self, bytes: &[u8], identifier: &str) -> ContentResult<String> {
        self.ensure_dir(&self.thumbnail_root)?;
        let relative = format!("{identifier}.png");
        let destination = self.thumbnail_root.join(&relative);
        fs::write(&destination, bytes).map_err(|err| ContentError::StorageWriteFailed {
            path: destination.clone(),
            source: err,
        })?;
        Ok(relative)
    }

    /// Returns the byte size of a stored payload; 0 when the file is missing.
    pub fn size_of(&self, relative_path: &str) -> u64 {
        fs::metadata(self.payload_root.join(relative_path))
            .map(|metadata| metadata.len())
            .unwrap_or(0)
    }

    /// Root directory holding item payloads.
    pub fn payload_root(&self) -> &Path {
        &self.payload_root
    }

    /// Root directory holding thumbnails.
    pub fn thumbnail_root(&self) -> &Path {
        &self.thumbnail_root
    }

    /// Resolves a stored relative payload path to an absolute path.
    ///
    /// Export collaborators (reveal, share, compress, save copy) consume
    /// this; the store itself performs no export.
    pub fn resolve_payload(&self, relative_path: &str) -> PathBuf {
        self.payload_root.join(relative_path)
    }

    fn ensure_dir(&self, dir: &Path) -> ContentResult<()> {
        fs::create_dir_all(dir).map_err(|err| ContentError::StorageWriteFailed {
            path: dir.to_path_buf(),
            source: err,
        })
    }

    fn vacant_payload_name(&self, file_name: &str) -> String {
        if !self.payload_root.join(file_name).exists() {
            return file_name.to_string();
        }

        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        let suffix = Uuid::new_v4();
        match path.extension() {
            Some(ext) => format!("{stem}-{suffix}.{}", ext.to_string_lossy()),
            None => format!("{stem}-{suffix}"),
        }
    }
}
