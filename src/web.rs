use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::repository::Repositories;

/// Open the configured stores and serve the API until Ctrl-C.
pub async fn start_server(config: Config) -> Result<()> {
    let repositories = Arc::new(Repositories::from_config(&config).await?);
    let address = config.server_address();
    let state = AppState::new(repositories, Arc::new(config))?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
