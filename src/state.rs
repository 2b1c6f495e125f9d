use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::foods::services::seed_from_file;
use crate::goals::UserLocks;
use crate::store::{InMemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub goal_locks: Arc<UserLocks>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let pg = PgStore::connect(url, config.db_max_connections).await?;
                pg.migrate().await?;
                info!("using postgres store");
                Arc::new(pg)
            }
            None => {
                info!("DATABASE_URL not set; using in-memory store");
                Arc::new(InMemoryStore::new())
            }
        };

        if let Some(path) = &config.foods_seed_path {
            seed_from_file(store.as_ref(), path).await?;
        }

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Self {
        Self {
            config,
            store,
            goal_locks: Arc::new(UserLocks::new()),
        }
    }

    /// In-memory state for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::with_store(
            Arc::new(AppConfig::for_tests()),
            Arc::new(InMemoryStore::new()),
        )
    }
}
