//! Inventory database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{InventoryItem, InventoryUpdate};

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: row.get(0)?,
        name: row.get(1)?,
        quantity: row.get(2)?,
        price: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

const ITEM_COLUMNS: &str = "id, name, quantity, price, created_at, updated_at";

impl Database {
    /// Insert a new inventory item.
    pub fn insert_item(&self, item: &InventoryItem) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO inventory (id, name, quantity, price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                item.id,
                item.name,
                item.quantity,
                item.price,
                item.created_at,
                item.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get an inventory item by id.
    pub fn get_item(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM inventory WHERE id = ?", ITEM_COLUMNS),
                [id],
                item_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all inventory items, name-ordered. No pagination: catalogs are
    /// assumed small.
    pub fn list_items(&self) -> DbResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM inventory ORDER BY name",
            ITEM_COLUMNS
        ))?;
        let rows = stmt.query_map([], item_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Merge the supplied fields into the stored item. Returns false when the
    /// id does not exist.
    pub fn update_item_fields(&self, id: &str, update: &InventoryUpdate) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE inventory SET
                name = COALESCE(?2, name),
                quantity = COALESCE(?3, quantity),
                price = COALESCE(?4, price),
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![id, update.name, update.quantity, update.price],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete an inventory item. Historical consultations keep their own
    /// name/price copies, so no cascade is needed.
    pub fn delete_item(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM inventory WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Search inventory by name using FTS5 (BM25 ranking, prefix matching).
    pub fn search_items_fts(&self, query: &str, limit: usize) -> DbResult<Vec<InventoryItem>> {
        let escaped_query = escape_fts_query(query);
        if escaped_query.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT i.id, i.name, i.quantity, i.price, i.created_at, i.updated_at,
                   bm25(inventory_fts) as rank
            FROM inventory i
            JOIN inventory_fts fts ON i.rowid = fts.rowid
            WHERE inventory_fts MATCH ?
            ORDER BY rank
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(params![escaped_query, limit as i64], item_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

/// Escape special FTS5 characters and prepare query for prefix matching.
pub(crate) fn escape_fts_query(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .map(|word| format!("{}*", word))
        .collect::<Vec<_>>()
        .join(" ")
}
