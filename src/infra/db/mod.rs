pub mod backup;
pub mod database;
pub mod repository;

pub use backup::{BackupDocument, BackupService};
pub use database::Database;
