//! URL parsing and the fixed route table.
//!
//! Routes are a closed set of tagged variants with typed parameters,
//! matched structurally on path segments, so every route's required fields
//! are statically known.

use std::fmt;
use std::str::FromStr;

use crate::domain::{OrderStatus, StoreError};

/// HTTP-style verbs understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

impl FromStr for Method {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(StoreError::validation(format!(
                "unsupported method: {other}"
            ))),
        }
    }
}

/// A request URL reduced to path and decoded query parameters. Accepts both
/// absolute (`http://host/inventory?x=1`) and relative (`/inventory?x=1`)
/// input; fragments are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestUrl {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RequestUrl {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.split('#').next().unwrap_or("");

        let rest = match raw.find("://") {
            Some(idx) => {
                let after = &raw[idx + 3..];
                match after.find('/') {
                    Some(slash) => &after[slash..],
                    None => "/",
                }
            }
            None => raw,
        };

        let (path, query) = match rest.split_once('?') {
            Some((p, q)) => (p, q),
            None => (rest, ""),
        };

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self {
            path,
            query: parse_query(query),
        }
    }

    /// First value for a query parameter, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Like [`Self::param`], but treats an empty value as absent; callers
    /// routinely send `?startDate=&endDate=`.
    pub fn non_empty_param(&self, name: &str) -> Option<&str> {
        self.param(name).filter(|value| !value.is_empty())
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(value))
        })
        .collect()
}

/// Minimal `application/x-www-form-urlencoded` decoding: `+` is a space and
/// `%XX` is a byte. Invalid escapes pass through untouched.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (hex_val(bytes.get(i + 1)), hex_val(bytes.get(i + 2))) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(byte: Option<&u8>) -> Option<u8> {
    byte.and_then(|b| (*b as char).to_digit(16)).map(|d| d as u8)
}

/// The fixed route table. First match wins; routes are mutually exclusive
/// by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    InventoryList {
        search: Option<String>,
        category: Option<String>,
    },
    InventoryCreate,
    InventoryGet {
        id: String,
    },
    InventoryUpdate {
        id: String,
    },
    InventoryDelete {
        id: String,
    },
    OrderList {
        status: Option<OrderStatus>,
    },
    OrderCreate,
    OrderUpdate {
        id: String,
    },
    OrderDelete {
        id: String,
    },
    OrderReport {
        start: Option<String>,
        end: Option<String>,
    },
}

impl Route {
    pub fn match_request(method: Method, url: &RequestUrl) -> Result<Route, StoreError> {
        let segments: Vec<&str> = url.path.split('/').filter(|s| !s.is_empty()).collect();

        match (method, segments.as_slice()) {
            (Method::Get, ["inventory"]) => Ok(Route::InventoryList {
                search: url.non_empty_param("search").map(str::to_string),
                category: url.non_empty_param("category").map(str::to_string),
            }),
            (Method::Post, ["inventory"]) => Ok(Route::InventoryCreate),
            (Method::Get, ["inventory", id]) => Ok(Route::InventoryGet {
                id: (*id).to_string(),
            }),
            (Method::Put, ["inventory", id]) => Ok(Route::InventoryUpdate {
                id: (*id).to_string(),
            }),
            (Method::Delete, ["inventory", id]) => Ok(Route::InventoryDelete {
                id: (*id).to_string(),
            }),
            (Method::Get, ["api", "purchase-orders"]) => Ok(Route::OrderList {
                status: url
                    .non_empty_param("status")
                    .map(OrderStatus::from_str)
                    .transpose()?,
            }),
            (Method::Post, ["api", "purchase-orders"]) => Ok(Route::OrderCreate),
            (Method::Put, ["api", "purchase-orders", id]) => Ok(Route::OrderUpdate {
                id: (*id).to_string(),
            }),
            (Method::Delete, ["api", "purchase-orders", id]) => Ok(Route::OrderDelete {
                id: (*id).to_string(),
            }),
            (Method::Get, ["api", "reports", "purchase-orders"]) => Ok(Route::OrderReport {
                start: url.non_empty_param("startDate").map(str::to_string),
                end: url.non_empty_param("endDate").map(str::to_string),
            }),
            _ => Err(StoreError::RouteNotFound {
                method: method.to_string(),
                path: url.path.clone(),
            }),
        }
    }
}
