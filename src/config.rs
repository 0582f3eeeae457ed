use serde::Deserialize;
use std::time::Duration;

use crate::services::ranking::UpdateRule;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of a remote content catalog. When unset, an in-memory catalog is used.
    #[serde(default)]
    pub catalog_url: Option<String>,

    /// JSON file of content used to seed the in-memory catalog
    #[serde(default)]
    pub catalog_seed_path: Option<String>,

    /// Upper bound on any single catalog lookup, in milliseconds
    #[serde(default = "default_catalog_timeout_ms")]
    pub catalog_timeout_ms: u64,

    /// Score added to the preferred item of a comparison
    #[serde(default = "default_k_win")]
    pub k_win: f64,

    /// Score subtracted from the other item of a comparison
    #[serde(default = "default_k_loss")]
    pub k_loss: f64,

    /// Number of comparison partners offered for a newly watched item
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_catalog_timeout_ms() -> u64 {
    2000
}

fn default_k_win() -> f64 {
    UpdateRule::DEFAULT_K_WIN
}

fn default_k_loss() -> f64 {
    UpdateRule::DEFAULT_K_LOSS
}

fn default_max_candidates() -> usize {
    3
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects update constants that would make scores meaningless
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [("K_WIN", self.k_win), ("K_LOSS", self.k_loss)] {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "{} must be a finite, non-negative number, got {}",
                name,
                value
            );
        }
        Ok(())
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_timeout_ms)
    }

    pub fn update_rule(&self) -> UpdateRule {
        UpdateRule::new(self.k_win, self.k_loss)
    }
}
