//! Error types for the Stockroom data substrate.
//!
//! Every repository and dispatcher failure funnels through [`StoreError`] so
//! calling code has a single failure-handling path. The dispatcher converts
//! these into failure envelopes; they never escape as panics.

use thiserror::Error;

/// Unified error taxonomy for the data substrate.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input failed shape or value validation (empty name, non-numeric
    /// quantity, malformed payload).
    #[error("{0}")]
    Validation(String),

    /// The operation targeted an id that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Engine-level I/O or quota failure. Surfaced as-is; callers decide
    /// whether to retry.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// No entry in the route table matched the request.
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }
}

// Payload parse failures are caller errors, not engine errors. Stored JSON
// that fails to decode on read is handled with defaults at the read site
// instead of going through this conversion.
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Validation(format!("invalid payload: {err}"))
    }
}
