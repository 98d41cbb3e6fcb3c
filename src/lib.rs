pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::{start_server, ApiContext, ServerError};
use crate::config::{AppConfig, ConfigError};
use crate::db::{open_database, DatabaseError};
use crate::pipeline::gemini::{GeminiClient, GeminiError};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model client error: {0}")]
    Client(#[from] GeminiError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(std::io::Error),
}

/// Run the service until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.gemini.model,
        db_path = %config.server.db_path.display(),
        "Configuration loaded"
    );

    // Apply migrations once up front so a broken store fails startup, not requests.
    drop(open_database(&config.server.db_path)?);

    let client = Arc::new(GeminiClient::new(&config.gemini)?);
    let addr = SocketAddr::new(config.server.bind_ip, config.server.port);
    let ctx = ApiContext::new(config, client);

    let server = start_server(ctx, addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    tokio::signal::ctrl_c().await.map_err(StartupError::Signal)?;
    tracing::info!("Shutdown requested");
    server.stop().await;

    Ok(())
}
