//! The two-phase ingestion pipeline

use crate::client::ExtractionClient;
use crate::commit::Committer;
use crate::config::IngestConfig;
use crate::error::{CommitError, IngestError};
use crate::normalize::Normalizer;
use crate::pdf::extract_text;
use crate::prompt::{truncate_chars, PromptBuilder};
use crate::storage::DocumentStorage;
use crate::types::{CommitOutcome, CommitRequest, IngestContext, ParsedDocument};
use retort_domain::{CompletionProvider, EntityStore};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Parses uploaded papers into candidates and commits reviewed candidates
///
/// `parse` never writes entities; `commit` is the only write path.
pub struct Ingestor<L, S, D> {
    client: ExtractionClient<L>,
    committer: Committer<S>,
    store: Arc<Mutex<S>>,
    storage: D,
    normalizer: Option<Normalizer>,
    config: IngestConfig,
}

impl<L, S, D> Ingestor<L, S, D>
where
    L: CompletionProvider + Send + Sync,
    S: EntityStore,
    S::Error: Display,
    D: DocumentStorage,
{
    /// Create an ingestor
    pub fn new(provider: L, store: S, storage: D, config: IngestConfig) -> Result<Self, IngestError> {
        config.validate().map_err(IngestError::Config)?;

        let store = Arc::new(Mutex::new(store));
        let prompts = PromptBuilder::new(
            config.prompt_char_budget,
            config.max_output_tokens,
            config.temperature,
        );

        Ok(Self {
            client: ExtractionClient::new(provider, prompts, config.ai_timeout()),
            committer: Committer::new(Arc::clone(&store), &config),
            store,
            storage,
            normalizer: None,
            config,
        })
    }

    /// Pin the normalizer (fixes the fallback year)
    ///
    /// Without this, each parse uses the year it runs in.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Shared store handle, for read paths
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Model extraction requests are sent to
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Active configuration
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Reject input that must not reach the PDF parser
    pub fn validate_upload(&self, bytes: &[u8]) -> Result<(), IngestError> {
        if bytes.is_empty() {
            return Err(IngestError::InputValidation("no document provided".to_string()));
        }
        if bytes.len() > self.config.max_upload_bytes {
            return Err(IngestError::TooLarge {
                size: bytes.len(),
                limit: self.config.max_upload_bytes,
            });
        }
        Ok(())
    }

    /// Extract candidates from a PDF
    ///
    /// Fails only on bad input, an unreadable PDF, or storage failure. Any
    /// problem with the AI call yields the empty skeleton plus a warning.
    pub async fn parse(
        &self,
        ctx: &IngestContext,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<ParsedDocument, IngestError> {
        self.validate_upload(&bytes)?;

        info!(
            "Parsing '{}' ({} bytes) for {}",
            filename,
            bytes.len(),
            ctx.contributor.as_deref().unwrap_or("anonymous")
        );

        let (extracted, bytes) = tokio::task::spawn_blocking(move || {
            let extracted = extract_text(&bytes);
            (extracted, bytes)
        })
        .await?;
        let extracted = extracted?;

        let stored_document_path = self
            .storage
            .store(&bytes)
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))?;

        let normalizer = self.normalizer.unwrap_or_else(Normalizer::new);
        let extraction = self.client.extract(&extracted.text, &normalizer).await;

        Ok(ParsedDocument {
            filename: filename.to_string(),
            stored_document_path,
            extracted_text_preview: truncate_chars(&extracted.text, self.config.preview_chars)
                .to_string(),
            page_count: extracted.page_count,
            paper_candidate: extraction.bundle.paper,
            compound_candidates: extraction.bundle.compounds,
            synthesis_route_candidates: extraction.bundle.synthesis_routes,
            extraction_warning: extraction.warning,
        })
    }

    /// Persist reviewed candidates
    pub fn commit(
        &self,
        ctx: &IngestContext,
        request: CommitRequest,
    ) -> Result<CommitOutcome, CommitError> {
        self.committer.commit(ctx, request)
    }
}
