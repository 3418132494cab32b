//! SQLite database setup and connection management for Stockroom.
//! Handles database initialization, schema creation, and connection management.

use anyhow::Result;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::infra::app_config;

/// Database wrapper that manages the SQLite connection.
///
/// All collection access serializes through the one mutex-guarded
/// connection; multi-collection atomicity uses SQLite transactions on it.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create or open the database at the default location.
    pub fn open() -> Result<Self> {
        let path = Self::default_path();
        Self::open_at(path)
    }

    /// Create an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Create or open the database at a specific path.
    pub fn open_at(path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Get the default database path.
    fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("STOCKROOM_DB_PATH") {
            return PathBuf::from(path);
        }

        app_config::app_data_dir().join("db.sqlite")
    }

    /// Initialize database schema. Idempotent: a fresh file gets the current
    /// schema directly; an existing file runs any pending migrations.
    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        const SCHEMA_VERSION: i32 = 1;

        let existing_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if existing_version == 0 {
            Self::create_schema(&conn)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        } else if existing_version < SCHEMA_VERSION {
            for version in (existing_version + 1)..=SCHEMA_VERSION {
                Self::run_migration(&conn, version)?;
            }
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }

    /// Get a reference to the connection.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    pub fn inventory_repo(&self) -> crate::infra::db::repository::InventoryRepository {
        crate::infra::db::repository::InventoryRepository::new(self.connection())
    }

    pub fn purchase_order_repo(&self) -> crate::infra::db::repository::PurchaseOrderRepository {
        crate::infra::db::repository::PurchaseOrderRepository::new(self.connection())
    }

    pub fn settings_repo(&self) -> crate::infra::db::repository::SettingsRepository {
        crate::infra::db::repository::SettingsRepository::new(self.connection())
    }

    pub fn backup(&self) -> crate::infra::db::BackupService {
        crate::infra::db::BackupService::new(self.connection())
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS inventory (
                id TEXT PRIMARY KEY,
                serial INTEGER NOT NULL DEFAULT 0,
                display_id TEXT NOT NULL DEFAULT '',
                name TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT '',
                quantity REAL NOT NULL DEFAULT 0,
                unit TEXT NOT NULL DEFAULT '',
                restock_threshold REAL NOT NULL DEFAULT 0,
                supplier TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                product_number TEXT NOT NULL DEFAULT '',
                last_price REAL
            );

            CREATE TABLE IF NOT EXISTS purchase_orders (
                id TEXT PRIMARY KEY,
                order_date TEXT NOT NULL DEFAULT '',
                supplier TEXT NOT NULL DEFAULT '',
                notes TEXT NOT NULL DEFAULT '',
                items TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'final' CHECK (status IN ('draft','final')),
                last_modified TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_inventory_name ON inventory(name);
            CREATE INDEX IF NOT EXISTS idx_inventory_category ON inventory(category);
            CREATE INDEX IF NOT EXISTS idx_purchase_orders_order_date ON purchase_orders(order_date);
            "#,
        )?;
        Ok(())
    }

    /// Execute a migration for the specified version.
    ///
    /// Migration scripts are embedded into the binary at compile time to
    /// ensure reliable execution in all environments without external
    /// dependencies. Version 1 is created directly by `create_schema`.
    fn run_migration(_conn: &Connection, version: i32) -> Result<()> {
        Err(anyhow::anyhow!(
            "Unknown migration version: {}. Add the migration to run_migration() in database.rs",
            version
        ))
    }
}
