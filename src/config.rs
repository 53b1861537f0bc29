use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;
use rand::{TryRngCore, rngs::OsRng};
use serde::Deserialize;
use std::sync::LazyLock;

use crate::common::{DEFAULT_DASHBOARD_APP, DEFAULT_DB_PATH, DEFAULT_TARGETLIST_COLUMNS};
use crate::visualization::views::{TargetColumn, parse_target_columns};

/// Service configuration, read from `TARGETVIEW_*` environment variables
/// (after loading `.env` if present).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path of the redb store.
    pub db_path: String,
    /// JWT secret; a random per-process key is used when unset.
    pub auth_key: Option<String>,
    /// Superuser created (or reset) at start-up.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    /// Registry name of the app rendered on the listing page.
    pub dashboard_app: String,
    /// Comma-separated `name:type` columns of the target grid; extras are
    /// named `extra.<key>`.
    pub targetlist_columns: String,
    /// Load demo targets into an empty store.
    pub seed_demo: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            auth_key: None,
            admin_username: None,
            admin_password: None,
            dashboard_app: DEFAULT_DASHBOARD_APP.to_string(),
            targetlist_columns: DEFAULT_TARGETLIST_COLUMNS.to_string(),
            seed_demo: false,
        }
    }
}

static FALLBACK_SECRET_KEY: LazyLock<Vec<u8>> = LazyLock::new(|| {
    let mut secret = vec![0u8; 32];
    OsRng
        .try_fill_bytes(&mut secret)
        .expect("Failed to generate random secret key");
    secret
});

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let config = envy::prefixed("TARGETVIEW_")
            .from_env::<AppConfig>()
            .context("Failed to read TARGETVIEW_* configuration")?;
        info!("Loaded config: db_path={} dashboard_app={}", config.db_path, config.dashboard_app);
        Ok(config)
    }

    pub fn jwt_secret_key(&self) -> Vec<u8> {
        match self.auth_key.as_ref() {
            Some(auth_key) => auth_key.as_bytes().to_vec(),
            None => FALLBACK_SECRET_KEY.clone(),
        }
    }

    pub fn target_columns(&self) -> Result<Vec<TargetColumn>> {
        parse_target_columns(&self.targetlist_columns)
            .context("Invalid TARGETVIEW_TARGETLIST_COLUMNS")
    }
}
