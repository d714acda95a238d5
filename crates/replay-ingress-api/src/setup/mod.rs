//! Application setup: telemetry, storage, and routing.

pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use replay_ingress_core::Config;

use crate::state::{AppState, UploadConfig};

/// Initialize the application and return the shared state and router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    crate::telemetry::init_telemetry(config.log_format())?;

    tracing::info!(
        environment = %config.environment(),
        production = config.is_production(),
        storage_backend = %config.storage_backend(),
        "Initializing replay ingress"
    );

    let storage = storage::initialize_storage(&config).await;
    let state = Arc::new(AppState::new(storage, UploadConfig::from_config(&config)));
    let router = routes::build_router(state.clone());

    Ok((state, router))
}
