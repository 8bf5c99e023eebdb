//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use retort_ingest::IngestConfig;
use retort_llm::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, read from `~/.retort/config.toml` unless `--config`
/// points elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory uploaded PDFs are copied into
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Contributor recorded on commits when `--contributor` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,

    /// Language model provider
    #[serde(default)]
    pub llm: ProviderConfig,

    /// Pipeline limits and defaults
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl CliConfig {
    /// Directory holding the default config, database and uploads.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".retort"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(CliError::Config("database_path cannot be empty".into()));
        }
        self.ingest
            .validate()
            .map_err(|e| CliError::Config(format!("[ingest] {}", e)))?;
        self.llm
            .validate()
            .map_err(|e| CliError::Config(format!("[llm] {}", e)))?;
        Ok(())
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            upload_dir: default_upload_dir(),
            contributor: None,
            llm: ProviderConfig::default(),
            ingest: IngestConfig::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_home_entry(name: &str) -> PathBuf {
    CliConfig::home()
        .unwrap_or_else(|_| PathBuf::from(".retort"))
        .join(name)
}

fn default_database_path() -> PathBuf {
    default_home_entry("retort.db")
}

fn default_upload_dir() -> PathBuf {
    default_home_entry("papers")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
