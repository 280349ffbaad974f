//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for items owned by shelves.
//! - Keep SQL details and insertion-order behavior inside the repository
//!   boundary.
//!
//! # Invariants
//! - `add_item` verifies the owning shelf exists inside the same transaction
//!   as the insert; a racing shelf delete resolves deterministically.
//! - `fetch_items` returns insertion order (`rowid ASC`).
//! - `delete_items` is best-effort; missing ids are silently skipped.

use crate::model::item::{ItemId, ItemKind, ShelfItem};
use crate::model::shelf::ShelfId;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    display_name,
    kind,
    payload_path,
    thumbnail_path,
    file_size
FROM items";

const ITEM_COLUMNS: &[&str] = &[
    "uuid",
    "shelf_uuid",
    "display_name",
    "kind",
    "payload_path",
    "thumbnail_path",
    "file_size",
];

/// Repository interface for item persistence.
pub trait ItemRepository {
    /// Inserts one item under an existing shelf.
    fn add_item(&self, item: &ShelfItem, shelf_id: ShelfId) -> RepoResult<ItemId>;
    /// Lists items owned by one shelf in insertion order.
    fn fetch_items(&self, shelf_id: ShelfId) -> RepoResult<Vec<ShelfItem>>;
    /// Removes the given items; ids that do not exist are skipped.
    fn delete_items(&self, ids: &[ItemId]) -> RepoResult<()>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "items", ITEM_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn add_item(&self, item: &ShelfItem, shelf_id: ShelfId) -> RepoResult<ItemId> {
        item.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let shelf_exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM shelves WHERE uuid = ?1);",
            [shelf_id.to_string()],
            |row| row.get(0),
        )?;
        if shelf_exists == 0 {
            return Err(RepoError::NotFound(shelf_id));
        }

        tx.execute(
            "INSERT INTO items (
                uuid,
                shelf_uuid,
                display_name,
                kind,
                payload_path,
                thumbnail_path,
                file_size
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                item.id.to_string(),
                shelf_id.to_string(),
                item.display_name.as_str(),
                item.kind.as_db_str(),
                item.payload_path.as_deref(),
                item.thumbnail_path.as_deref(),
                item.file_size,
            ],
        )?;
        tx.commit()?;

        Ok(item.id)
    }

    fn fetch_items(&self, shelf_id: ShelfId) -> RepoResult<Vec<ShelfItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL} WHERE shelf_uuid = ?1 ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([shelf_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn delete_items(&self, ids: &[ItemId]) -> RepoResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for id in ids {
            tx.execute("DELETE FROM items WHERE uuid = ?1;", [id.to_string()])?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ShelfItem> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "items.uuid")?;

    let kind_text: String = row.get("kind")?;
    let kind = ItemKind::from_db_str(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid item kind `{kind_text}` in items.kind"))
    })?;

    let item = ShelfItem {
        id,
        display_name: row.get("display_name")?,
        kind,
        payload_path: row.get("payload_path")?,
        thumbnail_path: row.get("thumbnail_path")?,
        file_size: row.get("file_size")?,
    };
    item.validate()?;
    Ok(item)
}
