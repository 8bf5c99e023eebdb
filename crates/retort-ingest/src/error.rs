//! Error types for the ingestion pipeline

use std::time::Duration;
use thiserror::Error;

/// Errors that abort a parse
#[derive(Error, Debug)]
pub enum IngestError {
    /// Request rejected before any processing
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// Upload larger than the configured limit
    #[error("Document too large: {size} bytes (max: {limit})")]
    TooLarge {
        /// Size of the rejected upload
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Bytes are not a readable PDF
    #[error("Could not read PDF: {0}")]
    Parse(String),

    /// The uploaded document could not be stored
    #[error("Document storage failed: {0}")]
    Storage(String),

    /// The blocking PDF worker panicked or was cancelled
    #[error("PDF worker failed: {0}")]
    Join(String),

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<tokio::task::JoinError> for IngestError {
    fn from(e: tokio::task::JoinError) -> Self {
        IngestError::Join(e.to_string())
    }
}

/// Failures of the AI extraction call
///
/// These never leave the extraction client: each one is logged and turned
/// into the empty skeleton.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AiError {
    /// Network, HTTP or provider failure
    #[error("AI service error: {0}")]
    Service(String),

    /// The reply held no usable JSON object
    #[error("Malformed AI response: {0}")]
    Malformed(String),

    /// No reply within the deadline
    #[error("AI call timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors that abort a whole commit
#[derive(Error, Debug)]
pub enum CommitError {
    /// The paper candidate cannot become a paper
    #[error("Invalid paper: {0}")]
    InvalidPaper(String),

    /// The paper could not be written
    #[error("Failed to create paper: {0}")]
    PersistenceFatal(String),

    /// The store handle is unusable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}
