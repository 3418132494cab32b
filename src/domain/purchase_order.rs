//! Purchase order entity, line-item normalization, and timestamps.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::StoreError;
use super::inventory::NumberLike;

/// Unique identifier for a purchase order.
pub type OrderId = String;

/// Lifecycle state of a purchase order. `draft` orders are mutable working
/// copies; finalizing is one-directional and triggers document generation
/// downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    #[default]
    Final,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Final => write!(f, "final"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "final" => Ok(Self::Final),
            other => Err(StoreError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

/// One line of a purchase order. Wire names keep the original JSON casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LineItemPayload")]
pub struct LineItem {
    #[serde(rename = "itemName")]
    pub item_name: String,
    pub quantity: f64,
    pub unit: String,
    pub supplier: String,
    pub product_number: String,
    pub price: Option<f64>,
}

/// Raw line item as received over the wire; numbers may arrive as strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LineItemPayload {
    #[serde(rename = "itemName")]
    pub item_name: Option<String>,
    pub quantity: Option<NumberLike>,
    pub unit: Option<String>,
    pub supplier: Option<String>,
    pub product_number: Option<String>,
    pub price: Option<NumberLike>,
}

// Line items are normalized forgivingly: unparsable quantities degrade to 0
// instead of failing the whole order, matching what the original client
// persisted for free-form item rows.
impl From<LineItemPayload> for LineItem {
    fn from(raw: LineItemPayload) -> Self {
        LineItem {
            item_name: raw.item_name.unwrap_or_default(),
            quantity: raw
                .quantity
                .as_ref()
                .and_then(|q| q.coerce("quantity").ok())
                .unwrap_or(0.0),
            unit: raw.unit.unwrap_or_default(),
            supplier: raw.supplier.unwrap_or_default(),
            product_number: raw.product_number.unwrap_or_default(),
            price: raw.price.as_ref().and_then(NumberLike::coerce_price),
        }
    }
}

/// A purchase order. `items` is always present; the legacy flat single-item
/// shape is folded into it during deserialization so nothing downstream ever
/// branches on shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "OrderPayload")]
pub struct PurchaseOrder {
    pub id: OrderId,
    #[serde(rename = "orderDate")]
    pub order_date: String,
    pub supplier: String,
    pub notes: String,
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
    pub last_modified: String,
}

/// Raw purchase order payload: used both as the create/update body accepted
/// by the repository and as the serde intermediate that normalizes persisted
/// documents on read.
///
/// Accepts an `items` array, the legacy `orderItems` alias, or the legacy
/// flat fields (`itemName`/`quantity`/`unit`/`supplier`/`product_number`/
/// `price`) describing a single line. Array forms win when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderPayload {
    pub id: Option<String>,
    #[serde(rename = "orderDate")]
    pub order_date: Option<String>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub items: Option<Vec<LineItem>>,
    #[serde(rename = "orderItems")]
    pub order_items: Option<Vec<LineItem>>,
    pub status: Option<OrderStatus>,
    pub last_modified: Option<String>,
    #[serde(rename = "itemName")]
    pub item_name: Option<String>,
    pub quantity: Option<NumberLike>,
    pub unit: Option<String>,
    pub product_number: Option<String>,
    pub price: Option<NumberLike>,
}

impl OrderPayload {
    /// The normalized line items this payload carries, or `None` when it
    /// says nothing about items (so updates leave them untouched).
    pub fn items_override(&self) -> Option<Vec<LineItem>> {
        if let Some(items) = &self.items {
            return Some(items.clone());
        }
        if let Some(items) = &self.order_items {
            return Some(items.clone());
        }
        if self.item_name.is_some() {
            return Some(vec![LineItem::from(LineItemPayload {
                item_name: self.item_name.clone(),
                quantity: self.quantity.clone(),
                unit: self.unit.clone(),
                supplier: self.supplier.clone(),
                product_number: self.product_number.clone(),
                price: self.price.clone(),
            })]);
        }
        None
    }
}

impl From<OrderPayload> for PurchaseOrder {
    fn from(payload: OrderPayload) -> Self {
        let items = payload.items_override().unwrap_or_default();
        PurchaseOrder {
            id: payload.id.unwrap_or_default(),
            order_date: payload.order_date.unwrap_or_default(),
            supplier: payload.supplier.unwrap_or_default(),
            notes: payload.notes.unwrap_or_default(),
            items,
            status: payload.status.unwrap_or_default(),
            last_modified: payload.last_modified.unwrap_or_default(),
        }
    }
}

impl PurchaseOrder {
    /// Calendar date used by range filtering: `orderDate`, falling back to
    /// `last_modified`, falling back to the current time. Matches the remote
    /// report's `date(orderDate)` comparison granularity.
    pub fn effective_date(&self) -> NaiveDate {
        parse_timestamp(&self.order_date)
            .or_else(|| parse_timestamp(&self.last_modified))
            .unwrap_or_else(Utc::now)
            .date_naive()
    }
}

/// Current time as an RFC 3339 UTC string with microsecond precision.
/// The fixed width keeps lexicographic and chronological order identical.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A timestamp guaranteed to sort strictly after `prev`. Two writes inside
/// the same microsecond otherwise produce equal `last_modified` values.
pub fn timestamp_after(prev: &str) -> String {
    let now = now_rfc3339();
    if now.as_str() > prev {
        return now;
    }
    match DateTime::parse_from_rfc3339(prev) {
        Ok(t) => (t.with_timezone(&Utc) + Duration::from_micros(1))
            .to_rfc3339_opts(SecondsFormat::Micros, true),
        Err(_) => now,
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Parse a range bound from a query parameter. Empty means unbounded;
/// garbage is a validation error rather than a silently empty result.
pub fn parse_date_bound(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, StoreError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(|t| Some(t.date_naive()))
            .ok_or_else(|| StoreError::validation(format!("{field} is not a valid date: {s}"))),
    }
}
