//! Domain types for the Stockroom data substrate.
//! Defines the entities, payloads, and error taxonomy used throughout.

pub mod error;
pub mod inventory;
pub mod purchase_order;
pub mod settings;

pub use error::*;
pub use inventory::*;
pub use purchase_order::*;
pub use settings::*;
