use crate::api::{ApiBackend, LocalApi};
use crate::infra::app_config::{self, AppConfig, StorageMode};
use crate::infra::db::Database;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared application state: the open database, the loaded configuration,
/// and the request backend chosen from it at startup.
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<RwLock<AppConfig>>,
    pub backend: Arc<dyn ApiBackend>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(app_config::load_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let db = match &config.db_path {
            Some(path) => Database::open_at(path.clone()),
            None => Database::open(),
        }
        .expect("Failed to open database");
        let db = Arc::new(db);

        if let Err(err) = db.inventory_repo().ensure_serials() {
            log::warn!("Failed to backfill inventory serials: {}", err);
        }

        // Remote mode needs a transport the embedding application injects
        // via `set_backend`; until then requests stay local.
        if config.mode == StorageMode::Remote {
            log::warn!("remote storage mode configured without a transport; serving locally");
        }
        let backend: Arc<dyn ApiBackend> = Arc::new(LocalApi::new(db.clone()));

        Self {
            db,
            config: Arc::new(RwLock::new(config)),
            backend,
        }
    }

    /// Swap in a different request backend (e.g. a remote transport).
    /// Callers keep depending on the trait, never on the mode flag.
    pub fn set_backend(&mut self, backend: Arc<dyn ApiBackend>) {
        self.backend = backend;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
