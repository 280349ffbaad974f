//! Canonical shelf/item store behind a single serialization point.
//!
//! # Responsibility
//! - Own the backing SQLite connection and serialize all mutations.
//! - Expose the CRUD surface used by ingestion and by UI collaborators.
//!
//! # Invariants
//! - Every operation runs while holding the connection lock; concurrent
//!   callers observe linearizable create/update/delete/fetch.
//! - An `add_item` racing a `delete_shelf` either lands before the cascade
//!   or fails with `NotFound`; never a silent orphan.
//! - Callers hold snapshots, not shared references; re-fetch after mutation.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::item::{ItemId, ShelfItem};
use crate::model::shelf::{Shelf, ShelfId, ValidationError};
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use crate::repo::shelf_repo::{ShelfRepository, SqliteShelfRepository};
use crate::repo::RepoError;
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by shelf store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Backing medium could not be opened, bootstrapped, or locked.
    Unavailable(String),
    /// Referenced shelf or item id is absent.
    NotFound(Uuid),
    /// Model-level invariant violation.
    Validation(ValidationError),
    /// SQLite transport error during an operation.
    Db(DbError),
    /// Persisted state could not be read back as a valid record.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "shelf store unavailable: {reason}"),
            Self::NotFound(id) => write!(f, "no shelf or item with id {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "shelf store query failed: {err}"),
            Self::InvalidData(message) => write!(f, "corrupt shelf store record: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Db(err) => Self::Db(err),
            RepoError::InvalidData(message) => Self::InvalidData(message),
            other @ (RepoError::UninitializedConnection { .. }
            | RepoError::MissingRequiredTable(_)
            | RepoError::MissingRequiredColumn { .. }) => Self::Unavailable(other.to_string()),
        }
    }
}

/// Sole owner of the canonical shelf/item records.
///
/// Constructed once at process start and handed by reference to the source
/// resolver and to all external collaborators; there is no global lookup.
pub struct ShelfStore {
    conn: Mutex<Connection>,
}

impl ShelfStore {
    /// Opens the store on a database file, applying migrations as needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = open_db(path).map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory store; used by tests and throwaway sessions.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory().map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates a shelf with configured defaults at the given position.
    pub fn create_shelf(&self, x: f32, y: f32) -> StoreResult<Shelf> {
        let shelf = Shelf::at_position(x, y);
        let conn = self.lock()?;
        SqliteShelfRepository::try_new(&conn)?.create_shelf(&shelf)?;
        info!(
            "event=shelf_created module=store status=ok shelf={} position=({x},{y})",
            shelf.id
        );
        Ok(shelf)
    }

    /// Full-record replace by id; last-writer-wins.
    pub fn update_shelf(&self, shelf: &Shelf) -> StoreResult<()> {
        let conn = self.lock()?;
        SqliteShelfRepository::try_new(&conn)?.update_shelf(shelf)?;
        Ok(())
    }

    /// Loads one shelf by id.
    pub fn fetch_shelf(&self, id: ShelfId) -> StoreResult<Option<Shelf>> {
        let conn = self.lock()?;
        Ok(SqliteShelfRepository::try_new(&conn)?.fetch_shelf(id)?)
    }

    /// Lists all shelves; order is stable across calls absent mutation.
    pub fn fetch_all_shelves(&self) -> StoreResult<Vec<Shelf>> {
        let conn = self.lock()?;
        Ok(SqliteShelfRepository::try_new(&conn)?.fetch_all_shelves()?)
    }

    /// Lists pinned shelves; the set restored at next process start.
    pub fn fetch_pinned_shelves(&self) -> StoreResult<Vec<Shelf>> {
        let conn = self.lock()?;
        Ok(SqliteShelfRepository::try_new(&conn)?.fetch_pinned_shelves()?)
    }

    /// Deletes a shelf and, transitively, every item it owns.
    ///
    /// On-disk payload/thumbnail files are not reclaimed here; stale blobs
    /// are acceptable.
    pub fn delete_shelf(&self, id: ShelfId) -> StoreResult<()> {
        let conn = self.lock()?;
        SqliteShelfRepository::try_new(&conn)?.delete_shelf(id)?;
        info!("event=shelf_deleted module=store status=ok shelf={id}");
        Ok(())
    }

    /// Applies the close-surface policy: deletes the shelf unless pinned.
    ///
    /// Returns whether a delete happened. A missing shelf is not an error;
    /// the surface may have raced an explicit delete.
    pub fn release_shelf(&self, id: ShelfId) -> StoreResult<bool> {
        let conn = self.lock()?;
        let repo = SqliteShelfRepository::try_new(&conn)?;
        match repo.fetch_shelf(id)? {
            Some(shelf) if !shelf.is_pinned => {
                repo.delete_shelf(id)?;
                info!("event=shelf_released module=store status=ok shelf={id} deleted=true");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Inserts one item under an existing shelf.
    pub fn add_item(&self, item: &ShelfItem, shelf_id: ShelfId) -> StoreResult<ItemId> {
        let conn = self.lock()?;
        let id = SqliteItemRepository::try_new(&conn)?.add_item(item, shelf_id)?;
        info!(
            "event=item_added module=store status=ok item={id} shelf={shelf_id} kind={}",
            item.kind.as_db_str()
        );
        Ok(id)
    }

    /// Lists a shelf's items in insertion order.
    pub fn fetch_items(&self, shelf_id: ShelfId) -> StoreResult<Vec<ShelfItem>> {
        let conn = self.lock()?;
        Ok(SqliteItemRepository::try_new(&conn)?.fetch_items(shelf_id)?)
    }

    /// Removes the given items; ids that do not exist are silently skipped.
    pub fn delete_items(&self, ids: &[ItemId]) -> StoreResult<()> {
        let conn = self.lock()?;
        SqliteItemRepository::try_new(&conn)?.delete_items(ids)?;
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}
