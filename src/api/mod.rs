//! REST-shaped request surface (the "local API shim").
//!
//! Callers issue `(method, url, body)` tuples and get fetch-shaped
//! responses back, whether the active backend is the bundled local store or
//! an injected remote transport. This module owns request/response shaping
//! only; business rules live in the repositories.

pub mod dispatcher;
pub mod envelope;
pub mod route;

pub use dispatcher::{ApiBackend, LocalApi};
pub use envelope::{ApiResponse, Envelope};
pub use route::{Method, RequestUrl, Route};
