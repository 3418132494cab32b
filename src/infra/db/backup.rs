//! Full-database backup and restore.
//!
//! The export document is the only durable cross-session interchange format
//! the substrate exposes; it must round-trip with no data loss and no
//! duplicate ids. Reads and writes each span all three collections inside a
//! single transaction so concurrent writers can never produce a torn
//! snapshot or a half-restored database.

use serde::{Deserialize, Serialize};

use super::repository::{DbConn, inventory, purchase_order, settings};
use crate::domain::{InventoryItem, PurchaseOrder, Setting, StoreError, now_rfc3339};

/// Current export document version.
const EXPORT_VERSION: u32 = 1;

fn default_version() -> u32 {
    EXPORT_VERSION
}

/// Portable snapshot of the whole local database.
///
/// Missing arrays deserialize as empty so restores stay forgiving;
/// wrong-typed fields are a validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(rename = "exportedAt", default)]
    pub exported_at: String,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(rename = "purchaseOrders", default)]
    pub purchase_orders: Vec<PurchaseOrder>,
    #[serde(default)]
    pub settings: Vec<Setting>,
}

/// Serializes and restores the three collections atomically.
pub struct BackupService {
    conn: DbConn,
}

impl BackupService {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    /// A consistent snapshot of all collections, read in one transaction.
    pub fn export_all(&self) -> Result<BackupDocument, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let document = BackupDocument {
            version: EXPORT_VERSION,
            exported_at: now_rfc3339(),
            inventory: inventory::read_all(&tx)?,
            purchase_orders: purchase_order::read_all(&tx)?,
            settings: settings::read_all(&tx)?,
        };

        tx.commit()?;
        Ok(document)
    }

    /// Restore from a document. With `replace`, all three collections are
    /// cleared and repopulated in one atomic transaction; otherwise existing
    /// ids are overwritten, new ids inserted, and nothing is deleted.
    pub fn import_all(&self, document: &BackupDocument, replace: bool) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        if replace {
            tx.execute("DELETE FROM inventory", [])?;
            tx.execute("DELETE FROM purchase_orders", [])?;
            tx.execute("DELETE FROM settings", [])?;
        }

        for item in &document.inventory {
            inventory::upsert(&tx, item)?;
        }
        for order in &document.purchase_orders {
            purchase_order::upsert(&tx, order)?;
        }
        for setting in &document.settings {
            settings::upsert(&tx, &setting.key, &setting.value)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Parse and restore a raw JSON document (the CLI import path).
    pub fn import_json(&self, raw: &str, replace: bool) -> Result<(), StoreError> {
        let document: BackupDocument = serde_json::from_str(raw)?;
        self.import_all(&document, replace)
    }
}
