use super::{DbConn, settings};
use crate::domain::{INVENTORY_SEQ_KEY, InventoryItem, InventoryPayload, StoreError, display_id_for};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

const COLUMNS: &str = "id, serial, display_id, name, category, quantity, unit, \
     restock_threshold, supplier, location, product_number, last_price";

/// Repository for inventory item operations.
///
/// Owns validation, numeric coercion, and display-id assignment. The
/// sequence counter lives in the settings collection and is read, bumped,
/// and written inside the same transaction as the insert it numbers, so
/// back-to-back creates can never observe the same value.
pub struct InventoryRepository {
    conn: DbConn,
}

impl InventoryRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    /// All records, unfiltered. Search/category filtering belongs to the
    /// dispatcher so remote mode can filter server-side identically.
    pub fn list_all(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let conn = self.conn.lock().unwrap();
        read_all(&conn).map_err(Into::into)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<InventoryItem>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM inventory WHERE id = ?1"))?;
        stmt.query_row([id], row_to_item).optional().map_err(Into::into)
    }

    pub fn create(&self, payload: InventoryPayload) -> Result<InventoryItem, StoreError> {
        let mut item = payload.into_new_item()?;

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let serial = read_counter(&tx)? + 1;
        settings::upsert(&tx, INVENTORY_SEQ_KEY, &serde_json::Value::from(serial))?;

        item.id = Uuid::new_v4().to_string();
        item.serial = serial;
        item.display_id = display_id_for(serial);
        upsert(&tx, &item)?;

        tx.commit()?;
        Ok(item)
    }

    pub fn update(&self, id: &str, payload: InventoryPayload) -> Result<InventoryItem, StoreError> {
        let mut item = self
            .find_by_id(id)?
            .ok_or_else(|| StoreError::not_found(format!("No inventory item with id: {id}")))?;
        payload.apply_to(&mut item)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE inventory SET name = ?2, category = ?3, quantity = ?4, unit = ?5, \
             restock_threshold = ?6, supplier = ?7, location = ?8, product_number = ?9, \
             last_price = ?10 WHERE id = ?1",
            params![
                item.id,
                item.name,
                item.category,
                item.quantity,
                item.unit,
                item.restock_threshold,
                item.supplier,
                item.location,
                item.product_number,
                item.last_price,
            ],
        )?;
        Ok(item)
    }

    /// Hard delete. Returns the affected-row count so the dispatcher can
    /// report a missing id the same way the remote server does.
    pub fn delete(&self, id: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute("DELETE FROM inventory WHERE id = ?1", [id])?;
        Ok(affected)
    }

    /// Startup pass over legacy data: raise the sequence counter to the
    /// largest serial present, then assign serial/display_id to records
    /// missing them. Returns how many records were backfilled.
    pub fn ensure_serials(&self) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut counter = read_counter(&tx)?;
        let max_serial: u64 =
            tx.query_row("SELECT COALESCE(MAX(serial), 0) FROM inventory", [], |row| {
                row.get::<_, i64>(0).map(|n| n.max(0) as u64)
            })?;
        counter = counter.max(max_serial);

        let missing: Vec<String> = {
            let mut stmt = tx.prepare(
                "SELECT id FROM inventory WHERE serial = 0 OR display_id = '' ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<Result<_, _>>()?
        };

        for id in &missing {
            counter += 1;
            tx.execute(
                "UPDATE inventory SET serial = ?2, display_id = ?3 WHERE id = ?1",
                params![id, counter as i64, display_id_for(counter)],
            )?;
        }

        settings::upsert(&tx, INVENTORY_SEQ_KEY, &serde_json::Value::from(counter))?;
        tx.commit()?;
        Ok(missing.len())
    }
}

/// Current value of the inventory sequence counter; 0 when unset.
fn read_counter(conn: &Connection) -> Result<u64, StoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            [INVENTORY_SEQ_KEY],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw
        .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
        .and_then(|v| v.as_u64())
        .unwrap_or(0))
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: row.get(0)?,
        serial: row.get::<_, i64>(1)?.max(0) as u64,
        display_id: row.get(2)?,
        name: row.get(3)?,
        category: row.get(4)?,
        quantity: row.get(5)?,
        unit: row.get(6)?,
        restock_threshold: row.get(7)?,
        supplier: row.get(8)?,
        location: row.get(9)?,
        product_number: row.get(10)?,
        last_price: row.get(11)?,
    })
}

pub(crate) fn read_all(conn: &Connection) -> rusqlite::Result<Vec<InventoryItem>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM inventory ORDER BY rowid"))?;
    let rows = stmt.query_map([], row_to_item)?;
    rows.collect()
}

pub(crate) fn upsert(conn: &Connection, item: &InventoryItem) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO inventory ({COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            item.id,
            item.serial as i64,
            item.display_id,
            item.name,
            item.category,
            item.quantity,
            item.unit,
            item.restock_threshold,
            item.supplier,
            item.location,
            item.product_number,
            item.last_price,
        ],
    )
}
