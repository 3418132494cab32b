use super::DbConn;
use crate::domain::{
    OrderPayload, OrderStatus, PurchaseOrder, StoreError, now_rfc3339, parse_date_bound,
    timestamp_after,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::str::FromStr;
use uuid::Uuid;

const COLUMNS: &str = "id, order_date, supplier, notes, items, status, last_modified";

/// Repository for purchase order operations.
///
/// Normalizes the legacy single-item shape into the `items` array at this
/// boundary; nothing downstream ever branches on shape.
pub struct PurchaseOrderRepository {
    conn: DbConn,
}

impl PurchaseOrderRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn list_all(&self) -> Result<Vec<PurchaseOrder>, StoreError> {
        let conn = self.conn.lock().unwrap();
        read_all(&conn).map_err(Into::into)
    }

    pub fn list_by_status(&self, status: OrderStatus) -> Result<Vec<PurchaseOrder>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM purchase_orders WHERE status = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map([status.to_string()], row_to_order)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Range filter over the order's effective date, inclusive on both
    /// bounds at calendar-date granularity (the remote report compares
    /// `date(orderDate)` against `date(bound)`). An absent or empty bound
    /// is unbounded on that side; omitting both equals `list_all`.
    pub fn list_by_date_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<PurchaseOrder>, StoreError> {
        let start = parse_date_bound(start, "startDate")?;
        let end = parse_date_bound(end, "endDate")?;

        let all = self.list_all()?;
        Ok(all
            .into_iter()
            .filter(|order| {
                let date = order.effective_date();
                start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
            })
            .collect())
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<PurchaseOrder>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM purchase_orders WHERE id = ?1"))?;
        stmt.query_row([id], row_to_order)
            .optional()
            .map_err(Into::into)
    }

    pub fn create(&self, payload: OrderPayload) -> Result<PurchaseOrder, StoreError> {
        let mut order = PurchaseOrder::from(payload);
        order.id = Uuid::new_v4().to_string();
        let now = now_rfc3339();
        if order.order_date.trim().is_empty() {
            order.order_date = now.clone();
        }
        order.last_modified = now;

        let conn = self.conn.lock().unwrap();
        upsert(&conn, &order)?;
        Ok(order)
    }

    pub fn update(&self, id: &str, payload: OrderPayload) -> Result<PurchaseOrder, StoreError> {
        let mut order = self
            .find_by_id(id)?
            .ok_or_else(|| StoreError::not_found(format!("No purchase order with id: {id}")))?;

        if let Some(items) = payload.items_override() {
            order.items = items;
        }
        if let Some(order_date) = payload.order_date {
            order.order_date = order_date;
        }
        if let Some(supplier) = payload.supplier {
            order.supplier = supplier;
        }
        if let Some(notes) = payload.notes {
            order.notes = notes;
        }
        if let Some(status) = payload.status {
            // Finalizing is one-directional.
            if order.status == OrderStatus::Final && status == OrderStatus::Draft {
                return Err(StoreError::validation(
                    "a final purchase order cannot return to draft",
                ));
            }
            order.status = status;
        }
        order.last_modified = timestamp_after(&order.last_modified);

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE purchase_orders SET order_date = ?2, supplier = ?3, notes = ?4, \
             items = ?5, status = ?6, last_modified = ?7 WHERE id = ?1",
            params![
                order.id,
                order.order_date,
                order.supplier,
                order.notes,
                serde_json::to_string(&order.items)?,
                order.status.to_string(),
                order.last_modified,
            ],
        )?;
        Ok(order)
    }

    /// Hard delete. Returns the affected-row count so the dispatcher can
    /// report a missing id the same way the remote server does.
    pub fn delete(&self, id: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute("DELETE FROM purchase_orders WHERE id = ?1", [id])?;
        Ok(affected)
    }
}

fn row_to_order(row: &Row<'_>) -> rusqlite::Result<PurchaseOrder> {
    let items_json: String = row.get(4)?;
    let status_raw: String = row.get(5)?;
    Ok(PurchaseOrder {
        id: row.get(0)?,
        order_date: row.get(1)?,
        supplier: row.get(2)?,
        notes: row.get(3)?,
        items: serde_json::from_str(&items_json).unwrap_or_default(),
        status: OrderStatus::from_str(&status_raw).unwrap_or_default(),
        last_modified: row.get(6)?,
    })
}

pub(crate) fn read_all(conn: &Connection) -> rusqlite::Result<Vec<PurchaseOrder>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM purchase_orders ORDER BY rowid"))?;
    let rows = stmt.query_map([], row_to_order)?;
    rows.collect()
}

pub(crate) fn upsert(conn: &Connection, order: &PurchaseOrder) -> rusqlite::Result<usize> {
    let items_json = serde_json::to_string(&order.items).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO purchase_orders ({COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ),
        params![
            order.id,
            order.order_date,
            order.supplier,
            order.notes,
            items_json,
            order.status.to_string(),
            order.last_modified,
        ],
    )
}
