use std::env;
use std::path::PathBuf;

use crate::domain::DomainError;

/// Credentials and location of the hosted search index.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub application_id: String,
    pub index: String,
    pub search_key: Option<String>,
    pub modify_key: Option<String>,
    /// Overrides the service hosts, e.g. `http://127.0.0.1:9200` for a local mock.
    pub host: Option<String>,
}

impl SearchConfig {
    /// Key for read-only queries.
    pub fn require_search_key(&self) -> Result<&str, DomainError> {
        self.search_key.as_deref().ok_or_else(|| {
            DomainError::Configuration(
                "Search keys are not set. Set ALGOLIA_SEARCH_KEY.".to_string(),
            )
        })
    }

    /// Key allowed to rewrite the index.
    pub fn require_modify_key(&self) -> Result<&str, DomainError> {
        self.modify_key.as_deref().ok_or_else(|| {
            DomainError::Configuration(
                "Search keys are not set. Set ALGOLIA_MODIFY_KEY.".to_string(),
            )
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    /// Directory holding the exported data document.
    pub data_dir: PathBuf,
    /// Public origin used to build absolute URLs in the sitemap.
    pub site_url: Option<String>,
    /// `None` when `ALGOLIA_APPLICATION_ID` is unset.
    pub search: Option<SearchConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let profile = var("PROFILE").unwrap_or_else(|| "default".to_string());

        let database_url = var("DATABASE_URL").unwrap_or_else(|| {
            if profile == "default" {
                "sqlite://audiobooks.db?mode=rwc".to_string()
            } else {
                format!("sqlite://audiobooks_{}.db?mode=rwc", profile)
            }
        });

        let search = var("ALGOLIA_APPLICATION_ID").map(|application_id| SearchConfig {
            application_id,
            index: var("ALGOLIA_INDEX").unwrap_or_else(|| "dev".to_string()),
            search_key: var("ALGOLIA_SEARCH_KEY"),
            modify_key: var("ALGOLIA_MODIFY_KEY"),
            host: var("ALGOLIA_HOST"),
        });

        Self {
            database_url,
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(8000),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            profile,
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("media")),
            site_url: var("SITE_URL").map(|s| s.trim_end_matches('/').to_string()),
            search,
        }
    }

    /// Search settings, failing with an operator-facing message when absent.
    pub fn require_search(&self) -> Result<&SearchConfig, DomainError> {
        self.search.as_ref().ok_or_else(|| {
            DomainError::Configuration(
                "Search keys are not set. Set ALGOLIA_APPLICATION_ID and the ALGOLIA_*_KEY variables."
                    .to_string(),
            )
        })
    }
}
