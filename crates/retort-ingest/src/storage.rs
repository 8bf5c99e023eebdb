//! Storage for uploaded documents

use std::future::Future;
use std::io;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Somewhere to keep uploaded PDFs
pub trait DocumentStorage {
    /// Persist `bytes` and return a stable path for them
    fn store(&self, bytes: &[u8]) -> impl Future<Output = io::Result<String>> + Send;
}

/// Stores documents as `paper-<uuid>.pdf` files in one directory
#[derive(Debug, Clone)]
pub struct LocalDocumentStorage {
    dir: PathBuf,
}

impl LocalDocumentStorage {
    /// Store under `dir`, created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl DocumentStorage for LocalDocumentStorage {
    async fn store(&self, bytes: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(format!("paper-{}.pdf", Uuid::now_v7()));
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }
}
