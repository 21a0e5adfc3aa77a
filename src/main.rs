use std::sync::Arc;

use anyhow::{Error, Result};
use return_notify::{
    api::{AppState, run_api_server},
    config::Config,
    utils::build_collaborators,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let collaborators = build_collaborators(&config).await?;

    info!("Configuration validated. Service is ready to start.");

    run_api_server(&config, Arc::new(AppState::new(collaborators))).await
}
