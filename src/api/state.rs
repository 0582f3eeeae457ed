use std::sync::Arc;

use crate::config::Config;
use crate::services::{ContentCatalog, HttpCatalog, InMemoryCatalog, RankingService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ranking: Arc<RankingService>,
}

impl AppState {
    /// Wires a ranking service with default settings to `catalog`
    pub fn new(catalog: Arc<dyn ContentCatalog>) -> Self {
        Self::with_service(RankingService::new(catalog))
    }

    pub fn with_service(ranking: RankingService) -> Self {
        Self {
            ranking: Arc::new(ranking),
        }
    }

    /// Builds the catalog and ranking service described by `config`
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let catalog: Arc<dyn ContentCatalog> = match (&config.catalog_url, &config.catalog_seed_path) {
            (Some(url), _) => Arc::new(HttpCatalog::new(url.clone(), config.catalog_timeout())?),
            (None, Some(path)) => Arc::new(InMemoryCatalog::from_json_file(path)?),
            (None, None) => Arc::new(InMemoryCatalog::new()),
        };

        tracing::info!(
            catalog = catalog.name(),
            k_win = config.k_win,
            k_loss = config.k_loss,
            max_candidates = config.max_candidates,
            "Initialized ranking service"
        );

        let ranking = RankingService::new(catalog)
            .with_rule(config.update_rule())
            .with_max_candidates(config.max_candidates)
            .with_catalog_timeout(config.catalog_timeout());

        Ok(Self::with_service(ranking))
    }
}
