//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse pipeline error
    #[error(transparent)]
    Ingest(#[from] retort_ingest::IngestError),

    /// Commit error
    #[error(transparent)]
    Commit(#[from] retort_ingest::CommitError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] retort_store::StoreError),

    /// LLM provider error
    #[error("LLM provider error: {0}")]
    Llm(#[from] retort_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Entity lookup miss
    #[error("Not found: {0}")]
    NotFound(String),
}
