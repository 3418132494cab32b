use super::DbConn;
use crate::domain::{Setting, StoreError};
use rusqlite::Connection;
use serde_json::Value;

/// Repository for the flat key/value settings collection.
pub struct SettingsRepository {
    conn: DbConn,
}

impl SettingsRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn get(&self, key: &str) -> Result<Option<Setting>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT key, value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query_map([key], |row| {
            let raw: String = row.get(1)?;
            Ok(Setting {
                key: row.get(0)?,
                value: serde_json::from_str(&raw).unwrap_or(Value::Null),
            })
        })?;

        match rows.next() {
            Some(row) => row.map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }

    pub fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        upsert(&conn, key, value)?;
        Ok(())
    }

    pub fn list_all(&self) -> Result<Vec<Setting>, StoreError> {
        let conn = self.conn.lock().unwrap();
        read_all(&conn).map_err(Into::into)
    }
}

pub(crate) fn read_all(conn: &Connection) -> rusqlite::Result<Vec<Setting>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
    let rows = stmt.query_map([], |row| {
        let raw: String = row.get(1)?;
        Ok(Setting {
            key: row.get(0)?,
            value: serde_json::from_str(&raw).unwrap_or(Value::Null),
        })
    })?;
    rows.collect()
}

pub(crate) fn upsert(conn: &Connection, key: &str, value: &Value) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        (key, value.to_string()),
    )
}
