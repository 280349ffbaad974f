//! Shelf repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the canonical `shelves` table.
//! - Keep SQL details and cascade behavior inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Shelf::validate()` before SQL mutations.
//! - `delete_shelf` removes owned items first, then the shelf, in one
//!   transaction; the table never holds orphaned items.
//! - Listing order is deterministic: `created_at ASC, uuid ASC`.

use crate::model::shelf::{Shelf, ShelfId};
use crate::repo::{ensure_connection_ready, parse_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const SHELF_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    color_hex,
    created_at,
    is_pinned,
    is_collapsed,
    position_x,
    position_y
FROM shelves";

const SHELF_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "color_hex",
    "created_at",
    "is_pinned",
    "is_collapsed",
    "position_x",
    "position_y",
];

/// Repository interface for shelf CRUD operations.
pub trait ShelfRepository {
    /// Persists one new shelf record.
    fn create_shelf(&self, shelf: &Shelf) -> RepoResult<ShelfId>;
    /// Full-record replace by id; last-writer-wins.
    fn update_shelf(&self, shelf: &Shelf) -> RepoResult<()>;
    /// Loads one shelf by id.
    fn fetch_shelf(&self, id: ShelfId) -> RepoResult<Option<Shelf>>;
    /// Lists all shelves in stable order.
    fn fetch_all_shelves(&self) -> RepoResult<Vec<Shelf>>;
    /// Lists pinned shelves in stable order (launch restore set).
    fn fetch_pinned_shelves(&self) -> RepoResult<Vec<Shelf>>;
    /// Deletes one shelf and all items it owns.
    fn delete_shelf(&self, id: ShelfId) -> RepoResult<()>;
}

/// SQLite-backed shelf repository.
pub struct SqliteShelfRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShelfRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "shelves", SHELF_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ShelfRepository for SqliteShelfRepository<'_> {
    fn create_shelf(&self, shelf: &Shelf) -> RepoResult<ShelfId> {
        shelf.validate()?;

        self.conn.execute(
            "INSERT INTO shelves (
                uuid,
                name,
                color_hex,
                created_at,
                is_pinned,
                is_collapsed,
                position_x,
                position_y
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                shelf.id.to_string(),
                shelf.name.as_str(),
                shelf.color_hex.as_str(),
                shelf.created_at,
                i64::from(shelf.is_pinned),
                i64::from(shelf.is_collapsed),
                shelf.position_x,
                shelf.position_y,
            ],
        )?;

        Ok(shelf.id)
    }

    fn update_shelf(&self, shelf: &Shelf) -> RepoResult<()> {
        shelf.validate()?;

        let changed = self.conn.execute(
            "UPDATE shelves
             SET
                name = ?1,
                color_hex = ?2,
                created_at = ?3,
                is_pinned = ?4,
                is_collapsed = ?5,
                position_x = ?6,
                position_y = ?7
             WHERE uuid = ?8;",
            params![
                shelf.name.as_str(),
                shelf.color_hex.as_str(),
                shelf.created_at,
                i64::from(shelf.is_pinned),
                i64::from(shelf.is_collapsed),
                shelf.position_x,
                shelf.position_y,
                shelf.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(shelf.id));
        }

        Ok(())
    }

    fn fetch_shelf(&self, id: ShelfId) -> RepoResult<Option<Shelf>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SHELF_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_shelf_row(row)?));
        }
        Ok(None)
    }

    fn fetch_all_shelves(&self) -> RepoResult<Vec<Shelf>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SHELF_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut shelves = Vec::new();
        while let Some(row) = rows.next()? {
            shelves.push(parse_shelf_row(row)?);
        }
        Ok(shelves)
    }

    fn fetch_pinned_shelves(&self) -> RepoResult<Vec<Shelf>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SHELF_SELECT_SQL} WHERE is_pinned = 1 ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut shelves = Vec::new();
        while let Some(row) = rows.next()? {
            shelves.push(parse_shelf_row(row)?);
        }
        Ok(shelves)
    }

    fn delete_shelf(&self, id: ShelfId) -> RepoResult<()> {
        // Explicit two-step cascade: items, then the shelf.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM items WHERE shelf_uuid = ?1;",
            [id.to_string()],
        )?;
        let changed = tx.execute("DELETE FROM shelves WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_shelf_row(row: &Row<'_>) -> RepoResult<Shelf> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "shelves.uuid")?;

    let is_pinned = parse_bool(row.get("is_pinned")?, "shelves.is_pinned")?;
    let is_collapsed = parse_bool(row.get("is_collapsed")?, "shelves.is_collapsed")?;

    let shelf = Shelf {
        id,
        name: row.get("name")?,
        color_hex: row.get("color_hex")?,
        created_at: row.get("created_at")?,
        is_pinned,
        is_collapsed,
        position_x: row.get("position_x")?,
        position_y: row.get("position_y")?,
    };
    shelf.validate()?;
    Ok(shelf)
}
