//! Retort Server
//!
//! HTTP surface for the ingestion pipeline: bearer sessions, the two-phase
//! upload (parse, then save), upload history, and read-only lookups.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod session;

use config::ServerConfig;
use handlers::{create_router, AppState};
use retort_ingest::{IngestError, Ingestor, LocalDocumentStorage};
use retort_llm::LlmError;
use retort_store::{SqliteStore, StoreError};
use session::SessionManager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Language model provider could not be built
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    /// Pipeline could not be built
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Wire store, provider, document storage and sessions from configuration
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    config.validate()?;

    let store = SqliteStore::new(&config.database_path)?;
    let provider = config.llm.build()?;
    let storage = LocalDocumentStorage::new(&config.upload_dir);
    let ingestor = Ingestor::new(provider, store, storage, config.ingest.clone())?;

    Ok(AppState {
        ingestor: Arc::new(ingestor),
        session_manager: Arc::new(SessionManager::new(
            &config.jwt_secret,
            config.token_expiry_secs,
        )),
    })
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing();

    info!("Starting Retort server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Upload directory: {}", config.upload_dir);

    let state = build_state(&config)?;
    info!("Extraction model: {}", state.ingestor.model_name());

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_from_test_config() {
        let config = ServerConfig::default_test_config();
        let state = build_state(&config).unwrap();
        assert_eq!(state.ingestor.model_name(), "mock");
    }

    #[test]
    fn test_build_state_rejects_bad_config() {
        let mut config = ServerConfig::default_test_config();
        config.jwt_secret.clear();
        assert!(matches!(build_state(&config), Err(ServerError::Config(_))));
    }
}
