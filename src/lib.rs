#[macro_use]
extern crate rocket;

use anyhow::{Context, Result};
use rocket::{Build, Rocket};
use std::sync::Arc;

pub mod api;
pub mod bootstrap;
pub mod common;
pub mod config;
pub mod database;
pub mod models;
pub mod templates;
pub mod visualization;

use crate::api::handlers::auth::generate_auth_routes;
use crate::api::handlers::targets::generate_target_routes;
use crate::config::AppConfig;
use crate::database::ops::store::TargetStore;
use crate::visualization::registry::DashboardRegistry;

/// Everything a request handler needs, managed by Rocket.
pub struct AppState {
    pub store: Arc<TargetStore>,
    pub registry: DashboardRegistry,
    pub config: AppConfig,
}

impl AppState {
    /// Build the dashboard registry from `config` and check that the
    /// configured app exists.
    pub fn new(config: AppConfig, store: TargetStore) -> Result<Self> {
        let registry = DashboardRegistry::with_builtin(config.target_columns()?);
        registry.get(&config.dashboard_app).with_context(|| {
            format!(
                "Available dashboard apps: {}",
                registry.names().collect::<Vec<_>>().join(", ")
            )
        })?;
        Ok(Self {
            store: Arc::new(store),
            registry,
            config,
        })
    }
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/", generate_target_routes())
        .mount("/", generate_auth_routes())
}
