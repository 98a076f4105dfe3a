//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use toolkit_core::Config;
use toolkit_storage::create_dir_if_not_exists;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry()?;

    tracing::info!(environment = %config.environment, "Configuration loaded");

    create_dir_if_not_exists(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to prepare {}", config.upload_dir.display()))?;

    let state = Arc::new(AppState::new(config));
    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
