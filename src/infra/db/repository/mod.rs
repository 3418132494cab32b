//! Repository implementations for data access in Stockroom.
//!
//! Repositories are typed CRUD façades over the SQLite engine: they own
//! validation, defaulting, and identity/sequence generation. Request
//! shaping and filtering stay in the dispatcher.

pub(crate) mod inventory;
pub(crate) mod purchase_order;
pub(crate) mod settings;

pub use inventory::InventoryRepository;
pub use purchase_order::PurchaseOrderRepository;
pub use settings::SettingsRepository;

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub(crate) type DbConn = Arc<Mutex<Connection>>;

#[cfg(test)]
mod tests;
