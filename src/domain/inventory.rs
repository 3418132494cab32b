//! Inventory item entity and payload coercion.

use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// Unique identifier for an inventory item.
pub type ItemId = String;

/// Width of the human-facing display id (`0001`, `0002`, ...).
const DISPLAY_ID_WIDTH: usize = 4;

/// A stocked item.
///
/// `id` is the opaque primary key; `display_id` is the zero-padded,
/// monotonically assigned number shown to users, backed by `serial`.
/// Both are assigned once at creation and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    /// Raw counter value behind `display_id`; 0 means "not yet assigned"
    /// (only seen on legacy imports, fixed up by the serial backfill).
    #[serde(default)]
    pub serial: u64,
    #[serde(default)]
    pub display_id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub restock_threshold: f64,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub product_number: String,
    #[serde(default)]
    pub last_price: Option<f64>,
}

/// Zero-padded display id for a counter value.
pub fn display_id_for(serial: u64) -> String {
    format!("{serial:0width$}", width = DISPLAY_ID_WIDTH)
}

/// A numeric field as web clients actually send it: a JSON number or a
/// string holding one. Coercion mirrors JavaScript's `Number(...)` where
/// that is well defined (`"" -> 0`), and rejects what `Number` would turn
/// into `NaN`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Num(f64),
    Text(String),
}

impl NumberLike {
    /// Coerce to a number, `ValidationError` on garbage.
    pub fn coerce(&self, field: &str) -> Result<f64, StoreError> {
        match self {
            NumberLike::Num(n) if n.is_finite() => Ok(*n),
            NumberLike::Num(_) => Err(StoreError::validation(format!("{field} must be finite"))),
            NumberLike::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(0.0);
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| StoreError::validation(format!("{field} must be a number")))
            }
        }
    }

    /// Coerce to a non-negative number.
    pub fn coerce_non_negative(&self, field: &str) -> Result<f64, StoreError> {
        let n = self.coerce(field)?;
        if n < 0.0 {
            return Err(StoreError::validation(format!(
                "{field} must not be negative"
            )));
        }
        Ok(n)
    }

    /// Price-style coercion: anything that is not a finite number becomes
    /// `None` rather than an error, matching how the original form fields
    /// treated blank and junk price inputs.
    pub fn coerce_price(&self) -> Option<f64> {
        match self {
            NumberLike::Num(n) if n.is_finite() => Some(*n),
            NumberLike::Num(_) => None,
            NumberLike::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

/// Create/update payload for inventory items.
///
/// Every field is optional: `create` fills defaults, `update` keeps the
/// current value for anything absent. Unknown fields (including attempts to
/// set `id`, `serial`, or `display_id`) are ignored by construction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InventoryPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<NumberLike>,
    pub unit: Option<String>,
    pub restock_threshold: Option<NumberLike>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub product_number: Option<String>,
    pub last_price: Option<NumberLike>,
}

impl InventoryPayload {
    /// Validate and default a creation payload into a record body.
    /// `id`, `serial`, and `display_id` are left for the repository.
    pub fn into_new_item(self) -> Result<InventoryItem, StoreError> {
        let name = self.name.as_deref().unwrap_or("").trim().to_string();
        if name.is_empty() {
            return Err(StoreError::validation("Name is required"));
        }

        let quantity = match &self.quantity {
            Some(q) => q.coerce_non_negative("quantity")?,
            None => 0.0,
        };
        let restock_threshold = match &self.restock_threshold {
            Some(t) => t.coerce_non_negative("restock_threshold")?,
            None => 0.0,
        };
        let last_price = self.last_price.as_ref().and_then(NumberLike::coerce_price);

        Ok(InventoryItem {
            id: String::new(),
            serial: 0,
            display_id: String::new(),
            name,
            category: trimmed(self.category),
            quantity,
            unit: trimmed(self.unit),
            restock_threshold,
            supplier: trimmed(self.supplier),
            location: trimmed(self.location),
            product_number: trimmed(self.product_number),
            last_price,
        })
    }

    /// Merge this payload over an existing record, re-coercing every field
    /// that is present with the same rules as creation.
    pub fn apply_to(self, current: &mut InventoryItem) -> Result<(), StoreError> {
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(StoreError::validation("Name is required"));
            }
            current.name = name;
        }
        if let Some(category) = self.category {
            current.category = category.trim().to_string();
        }
        if let Some(quantity) = self.quantity {
            current.quantity = quantity.coerce_non_negative("quantity")?;
        }
        if let Some(unit) = self.unit {
            current.unit = unit.trim().to_string();
        }
        if let Some(threshold) = self.restock_threshold {
            current.restock_threshold = threshold.coerce_non_negative("restock_threshold")?;
        }
        if let Some(supplier) = self.supplier {
            current.supplier = supplier.trim().to_string();
        }
        if let Some(location) = self.location {
            current.location = location.trim().to_string();
        }
        if let Some(product_number) = self.product_number {
            current.product_number = product_number.trim().to_string();
        }
        if let Some(price) = self.last_price {
            current.last_price = price.coerce_price();
        }
        Ok(())
    }
}

fn trimmed(value: Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_string()
}
