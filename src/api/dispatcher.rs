//! The dispatch seam and its local implementation.
//!
//! `ApiBackend` is the one interface callers depend on; the storage mode
//! picked at startup decides which implementation sits behind it. The local
//! implementation routes requests into the repositories and converts every
//! repository error into a failure envelope. Nothing escapes this boundary
//! as a panic.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

use super::envelope::ApiResponse;
use super::route::{Method, RequestUrl, Route};
use crate::domain::{InventoryItem, InventoryPayload, OrderPayload, StoreError};
use crate::infra::db::Database;

/// The request surface both storage modes satisfy identically. A remote
/// implementation forwards the tuple verbatim to its transport; the local
/// one reproduces the same semantics from local state.
#[async_trait]
pub trait ApiBackend: Send + Sync {
    async fn dispatch(&self, method: Method, url: &str, body: Option<&Value>) -> ApiResponse;
}

/// Local API shim over the embedded database.
pub struct LocalApi {
    db: Arc<Database>,
}

impl LocalApi {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn handle(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, StoreError> {
        let url = RequestUrl::parse(url);
        let route = Route::match_request(method, &url)?;

        match route {
            Route::InventoryList { search, category } => {
                let items = self.db.inventory_repo().list_all()?;
                let items = filter_inventory(items, search.as_deref(), category.as_deref());
                Ok(ApiResponse::success(200, serde_json::to_value(items)?))
            }
            Route::InventoryCreate => {
                let payload: InventoryPayload = parse_body(body)?;
                let item = self.db.inventory_repo().create(payload)?;
                Ok(ApiResponse::success(201, serde_json::to_value(item)?))
            }
            Route::InventoryGet { id } => {
                let item = self.db.inventory_repo().find_by_id(&id)?.ok_or_else(|| {
                    StoreError::not_found(format!("No inventory item with id: {id}"))
                })?;
                Ok(ApiResponse::success(200, serde_json::to_value(item)?))
            }
            Route::InventoryUpdate { id } => {
                let payload: InventoryPayload = parse_body(body)?;
                let item = self.db.inventory_repo().update(&id, payload)?;
                Ok(ApiResponse::success(200, serde_json::to_value(item)?))
            }
            Route::InventoryDelete { id } => {
                deleted_response(self.db.inventory_repo().delete(&id)?, "inventory item", &id)
            }
            Route::OrderList { status } => {
                let repo = self.db.purchase_order_repo();
                let orders = match status {
                    Some(status) => repo.list_by_status(status)?,
                    None => repo.list_all()?,
                };
                Ok(ApiResponse::success(200, serde_json::to_value(orders)?))
            }
            Route::OrderCreate => {
                let payload: OrderPayload = parse_body(body)?;
                let order = self.db.purchase_order_repo().create(payload)?;
                Ok(ApiResponse::success(201, serde_json::to_value(order)?))
            }
            Route::OrderUpdate { id } => {
                let payload: OrderPayload = parse_body(body)?;
                let order = self.db.purchase_order_repo().update(&id, payload)?;
                Ok(ApiResponse::success(200, serde_json::to_value(order)?))
            }
            Route::OrderDelete { id } => {
                deleted_response(self.db.purchase_order_repo().delete(&id)?, "purchase order", &id)
            }
            Route::OrderReport { start, end } => {
                let orders = self
                    .db
                    .purchase_order_repo()
                    .list_by_date_range(start.as_deref(), end.as_deref())?;
                Ok(ApiResponse::success(200, serde_json::to_value(orders)?))
            }
        }
    }
}

#[async_trait]
impl ApiBackend for LocalApi {
    async fn dispatch(&self, method: Method, url: &str, body: Option<&Value>) -> ApiResponse {
        match self.handle(method, url, body) {
            Ok(response) => response,
            Err(err) => ApiResponse::failure(status_for(&err), err.to_string()),
        }
    }
}

fn parse_body<T: DeserializeOwned + Default>(body: Option<&Value>) -> Result<T, StoreError> {
    match body {
        Some(value) => serde_json::from_value(value.clone()).map_err(Into::into),
        None => Ok(T::default()),
    }
}

fn deleted_response(affected: usize, what: &str, id: &str) -> Result<ApiResponse, StoreError> {
    if affected == 0 {
        return Err(StoreError::not_found(format!("No {what} with id: {id}")));
    }
    Ok(ApiResponse::success(200, json!({ "deleted": affected })))
}

fn status_for(err: &StoreError) -> u16 {
    match err {
        StoreError::Validation(_) => 400,
        StoreError::NotFound(_) => 404,
        StoreError::RouteNotFound { .. } => 404,
        StoreError::Storage(_) => 500,
    }
}

/// Collection-route filtering: `search` matches name and product number
/// case-insensitively; `category` is an exact match, with `"All"` meaning
/// no filter.
fn filter_inventory(
    items: Vec<InventoryItem>,
    search: Option<&str>,
    category: Option<&str>,
) -> Vec<InventoryItem> {
    let needle = search.map(str::to_lowercase);
    let category = category.filter(|c| *c != "All");

    items
        .into_iter()
        .filter(|item| {
            if let Some(needle) = &needle {
                let hit = item.name.to_lowercase().contains(needle)
                    || item.product_number.to_lowercase().contains(needle);
                if !hit {
                    return false;
                }
            }
            if let Some(category) = category {
                if item.category != category {
                    return false;
                }
            }
            true
        })
        .collect()
}
