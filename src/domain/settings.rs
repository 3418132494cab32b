//! Settings records: flat key/value pairs.

use serde::{Deserialize, Serialize};

/// Settings key holding the inventory sequence counter.
pub const INVENTORY_SEQ_KEY: &str = "inventory_seq";

/// One settings entry. Values are arbitrary JSON so counters and user
/// preferences share a single collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}
