//! Command implementations.

pub mod commit;
pub mod papers;
pub mod parse;
pub mod show;

pub use self::commit::execute_commit;
pub use self::papers::execute_papers;
pub use self::parse::execute_parse;
pub use self::show::execute_show;

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use retort_ingest::{Ingestor, LocalDocumentStorage};
use retort_llm::AnyProvider;
use retort_store::{SqliteStore, StoreError};
use std::fs;
use tracing::debug;

/// Ingestor as wired by the CLI
pub type CliIngestor = Ingestor<AnyProvider, SqliteStore, LocalDocumentStorage>;

/// Open the database and build the pipeline described by `config`.
pub fn build_ingestor(config: &CliConfig) -> Result<CliIngestor> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    debug!("Opening database {}", config.database_path.display());
    let store = SqliteStore::new(&config.database_path)?;
    let provider = config.llm.build()?;
    let storage = LocalDocumentStorage::new(&config.upload_dir);

    Ok(Ingestor::new(provider, store, storage, config.ingest.clone())?)
}

/// Run read-only work against the ingestor's store.
pub(crate) fn with_store<T>(
    ingestor: &CliIngestor,
    op: impl FnOnce(&SqliteStore) -> std::result::Result<T, StoreError>,
) -> Result<T> {
    let store = ingestor.store();
    let guard = store
        .lock()
        .map_err(|e| CliError::Config(format!("store lock poisoned: {}", e)))?;
    Ok(op(&guard)?)
}
