use anyhow::Result;
use log::{error, info};

use targetview::bootstrap::setup::{initialize_logger, initialize_store};
use targetview::config::AppConfig;
use targetview::{AppState, build_rocket};

#[rocket::main]
async fn main() -> Result<()> {
    initialize_logger();

    let config = AppConfig::from_env()?;
    let store = initialize_store(&config)?;
    let state = AppState::new(config, store)?;
    info!(
        "Listing targets with the '{}' dashboard app",
        state.config.dashboard_app
    );

    if let Err(e) = build_rocket(state).launch().await {
        error!("Rocket server failed: {}", e);
        return Err(anyhow::Error::from(e));
    }
    Ok(())
}
