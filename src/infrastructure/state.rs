//! Application state containing shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{DomainError, SearchIndex};
use crate::infrastructure::config::Config;
use crate::infrastructure::snapshot_store::SnapshotStore;
use crate::modules::integrations::AlgoliaClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub config: Arc<Config>,
    /// `None` when the search index is not configured
    pub search: Option<Arc<dyn SearchIndex>>,
    /// Storage of the exported data document
    pub snapshots: SnapshotStore,
}

impl AppState {
    /// Create the state from configuration, wiring the search client if configured
    pub fn new(db: DatabaseConnection, config: Config) -> Result<Self, DomainError> {
        let search: Option<Arc<dyn SearchIndex>> = match &config.search {
            Some(search_config) => {
                let client = AlgoliaClient::new(search_config.clone())?;
                Some(Arc::new(client) as Arc<dyn SearchIndex>)
            }
            None => None,
        };
        let snapshots = SnapshotStore::new(&config.data_dir);

        Ok(Self {
            db,
            config: Arc::new(config),
            search,
            snapshots,
        })
    }

    /// Replace the search backend (used by tests and alternative backends)
    pub fn with_search(mut self, search: Arc<dyn SearchIndex>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Search backend, or a configuration error naming the missing settings
    pub fn require_search(&self) -> Result<Arc<dyn SearchIndex>, DomainError> {
        match &self.search {
            Some(search) => Ok(search.clone()),
            None => Err(self
                .config
                .require_search()
                .err()
                .unwrap_or_else(|| DomainError::Configuration("Search is not configured".into()))),
        }
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
