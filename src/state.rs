use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::storage::{JsonFileStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    /// Held for the whole read-modify-write of every mutation.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = JsonFileStore::new(config.users_file.clone());
        store.ensure_exists().await?;
        tracing::info!(path = %store.path().display(), "store ready");

        Ok(Self::from_parts(config, Arc::new(store)))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn UserStore>) -> Self {
        Self {
            config,
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[cfg(test)]
    pub fn fake(store: Arc<dyn UserStore>) -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            users_file: "users.json".into(),
        });
        Self::from_parts(config, store)
    }
}
