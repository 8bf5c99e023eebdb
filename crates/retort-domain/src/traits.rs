//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the ingestion pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{Compound, CompoundId, Paper, PaperId, SynthesisRoute, SynthesisRouteId};
use std::future::Future;

/// Document store for the three entity kinds
///
/// Implemented by the infrastructure layer (retort-store). Each call is an
/// independent write; there is no transaction spanning entity kinds.
pub trait EntityStore {
    /// Error type for store operations
    type Error;

    /// Insert a new paper
    fn create_paper(&mut self, paper: Paper) -> Result<PaperId, Self::Error>;

    /// Get a paper by ID
    fn get_paper(&self, id: PaperId) -> Result<Option<Paper>, Self::Error>;

    /// Replace a paper's compound back-references
    fn set_paper_compounds(
        &mut self,
        id: PaperId,
        compounds: &[CompoundId],
    ) -> Result<(), Self::Error>;

    /// List papers, newest first
    fn list_papers(&self, query: &PaperQuery) -> Result<Vec<Paper>, Self::Error>;

    /// Count papers matching the query's filters (paging is ignored)
    fn count_papers(&self, query: &PaperQuery) -> Result<usize, Self::Error>;

    /// Insert a new compound
    fn create_compound(&mut self, compound: Compound) -> Result<CompoundId, Self::Error>;

    /// Get a compound by ID
    fn get_compound(&self, id: CompoundId) -> Result<Option<Compound>, Self::Error>;

    /// Point a compound at the route that produces it
    fn set_compound_route(
        &mut self,
        id: CompoundId,
        route: SynthesisRouteId,
    ) -> Result<(), Self::Error>;

    /// Insert a new synthesis route; its compound must already exist
    fn create_synthesis_route(
        &mut self,
        route: SynthesisRoute,
    ) -> Result<SynthesisRouteId, Self::Error>;

    /// Get a synthesis route by ID
    fn get_synthesis_route(
        &self,
        id: SynthesisRouteId,
    ) -> Result<Option<SynthesisRoute>, Self::Error>;

    /// Resolve a list of compound references, skipping dangling ids
    fn get_compounds(&self, ids: &[CompoundId]) -> Result<Vec<Compound>, Self::Error> {
        let mut compounds = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(compound) = self.get_compound(*id)? {
                compounds.push(compound);
            }
        }
        Ok(compounds)
    }

    /// Resolve a list of paper references, skipping dangling ids
    fn get_papers(&self, ids: &[PaperId]) -> Result<Vec<Paper>, Self::Error> {
        let mut papers = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(paper) = self.get_paper(*id)? {
                papers.push(paper);
            }
        }
        Ok(papers)
    }
}

/// Query criteria for listing papers
#[derive(Debug, Clone, Default)]
pub struct PaperQuery {
    /// Only papers from this contributor
    pub contributor: Option<String>,

    /// Number of papers to skip
    pub offset: usize,

    /// Maximum results to return
    pub limit: Option<usize>,
}

/// A single completion call to a language model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction
    pub system: String,

    /// User prompt
    pub prompt: String,

    /// Hard cap on generated tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

/// Trait for language model providers
///
/// Implemented by the infrastructure layer (retort-llm). The returned
/// future must be `Send` so that the pipeline can run inside HTTP handlers.
pub trait CompletionProvider {
    /// Error type for LLM operations
    type Error: std::fmt::Display + Send;

    /// Generate a completion and return the raw text
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Identifier of the model requests are sent to
    fn model_name(&self) -> &str;
}
