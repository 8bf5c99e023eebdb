//! Retort Ingest
//!
//! Turns uploaded chemistry papers into reviewable candidates and commits
//! reviewed candidates as cross-referenced entities.
//!
//! # Architecture
//!
//! ```text
//! parse:  PDF bytes → text → LLM → JSON → Normalizer → candidates
//! commit: candidates → Paper → Compounds → Reconciler → Routes → back-references
//! ```
//!
//! Between the two phases a human reviews and edits the candidates.
//!
//! # Example Usage
//!
//! ```no_run
//! use retort_ingest::{IngestConfig, IngestContext, Ingestor, LocalDocumentStorage};
//! use retort_llm::MockProvider;
//! use retort_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ingestor = Ingestor::new(
//!     MockProvider::new("{}"),
//!     SqliteStore::new(":memory:")?,
//!     LocalDocumentStorage::new("uploads/papers"),
//!     IngestConfig::default(),
//! )?;
//!
//! let ctx = IngestContext::for_contributor("user-1");
//! let parsed = ingestor.parse(&ctx, "paper.pdf", std::fs::read("paper.pdf")?).await?;
//! let outcome = ingestor.commit(&ctx, parsed.into())?;
//! println!("Created {} compounds", outcome.compounds_created);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod commit;
mod config;
mod error;
mod normalize;
mod parser;
mod pdf;
mod pipeline;
mod prompt;
mod reconcile;
mod storage;
mod types;
#[allow(missing_docs)]
pub mod views;

#[cfg(test)]
mod tests;

pub use client::{Extraction, ExtractionClient};
pub use commit::Committer;
pub use config::IngestConfig;
pub use error::{AiError, CommitError, IngestError};
pub use normalize::{Normalizer, TITLE_SENTINEL};
pub use parser::parse_ai_response;
pub use pdf::{extract_text, ExtractedText};
pub use pipeline::Ingestor;
pub use prompt::{truncate_chars, PromptBuilder, SYSTEM_PROMPT};
pub use reconcile::{reconcile, MatchKind, Reconciliation, RouteAssignment};
pub use storage::{DocumentStorage, LocalDocumentStorage};
pub use types::{
    CandidateBundle, CommitOutcome, CommitRequest, CompoundCandidate, IngestContext, ItemFailure,
    ItemKind, PaperCandidate, ParsedDocument, StepCandidate, SynthesisRouteCandidate,
};
