//! Configuration file parsing for the server.
//!
//! Loads bind settings, the JWT secret, storage locations, and the `[llm]`
//! and `[ingest]` tables from TOML.

use retort_ingest::IngestConfig;
use retort_llm::ProviderConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field has an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// JWT secret for signing tokens
    pub jwt_secret: String,

    /// Token expiry in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory uploaded PDFs are written to
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Language model provider
    #[serde(default)]
    pub llm: ProviderConfig,

    /// Pipeline tunables
    #[serde(default)]
    pub ingest: IngestConfig,
}

fn default_token_expiry() -> u64 {
    3600
}

fn default_database_path() -> String {
    "retort.db".to_string()
}

fn default_upload_dir() -> String {
    "uploads/papers".to_string()
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and nested tables
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingField("jwt_secret".to_string()));
        }
        if self.database_path.is_empty() {
            return Err(ConfigError::MissingField("database_path".to_string()));
        }
        self.ingest
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[ingest] {}", e)))?;
        self.llm
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[llm] {}", e)))?;
        Ok(())
    }

    /// Create a default configuration for testing
    ///
    /// Uses an in-memory database and a mock model.
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            jwt_secret: "test-secret-key-do-not-use-in-production".to_string(),
            token_expiry_secs: 3600,
            database_path: ":memory:".to_string(),
            upload_dir: std::env::temp_dir()
                .join("retort-uploads")
                .to_string_lossy()
                .into_owned(),
            llm: ProviderConfig::mock("{}"),
            ingest: IngestConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
