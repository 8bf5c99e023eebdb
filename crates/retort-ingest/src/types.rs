//! Candidate records and the inputs/outputs of parse and commit
//!
//! Candidates are untrusted: they come from the model and are then edited
//! by a reviewer. They serialize in camelCase, which is also a form the
//! normalizer accepts.

use crate::views::PaperView;
use retort_domain::PaperId;
use serde::{Deserialize, Serialize};

/// Proposed paper metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaperCandidate {
    /// Title
    pub title: String,
    /// Author names
    pub authors: Vec<String>,
    /// Abstract
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Journal or venue
    pub journal: String,
    /// Publication year
    pub year: i32,
    /// Keywords; become the paper's tags
    pub keywords: Vec<String>,
}

/// Proposed compound
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompoundCandidate {
    /// Compound name
    pub name: String,
    /// Structural class
    pub category: String,
    /// Short description
    pub description: String,
    /// SMILES string suggested by the model
    pub possible_smiles: String,
    /// Reported activities
    pub bioactivity: Vec<String>,
    /// Free-form tags
    pub tags: Vec<String>,
}

/// One step of a proposed route
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepCandidate {
    /// Position in the route (1-based)
    pub step_number: u32,
    /// Starting material
    pub from: String,
    /// Product
    pub to: String,
    /// Reagent
    pub reagent: String,
    /// Reaction conditions
    pub conditions: String,
    /// Free-text description
    pub description: String,
}

/// Proposed synthesis route
///
/// Refers to its compound only through its name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisRouteCandidate {
    /// Route name
    pub name: String,
    /// Ordered steps
    pub steps: Vec<StepCandidate>,
    /// Notes
    pub notes: String,
}

/// Everything proposed for one document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateBundle {
    /// Paper metadata
    pub paper: PaperCandidate,
    /// Compounds
    pub compounds: Vec<CompoundCandidate>,
    /// Synthesis routes
    pub synthesis_routes: Vec<SynthesisRouteCandidate>,
}

/// Caller identity threaded through parse and commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestContext {
    /// Contributor id, recorded on papers and routes
    pub contributor: Option<String>,
}

impl IngestContext {
    /// Context for a known contributor
    pub fn for_contributor(contributor: impl Into<String>) -> Self {
        Self {
            contributor: Some(contributor.into()),
        }
    }
}

/// Result of parsing an uploaded PDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    /// Name the document was uploaded under
    pub filename: String,
    /// Where the document was stored
    pub stored_document_path: String,
    /// Leading slice of the extracted text
    pub extracted_text_preview: String,
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Proposed paper
    pub paper_candidate: PaperCandidate,
    /// Proposed compounds
    pub compound_candidates: Vec<CompoundCandidate>,
    /// Proposed routes
    pub synthesis_route_candidates: Vec<SynthesisRouteCandidate>,
    /// Why the candidates are the empty skeleton, if they are
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_warning: Option<String>,
}

/// Reviewed candidates submitted for persistence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitRequest {
    /// Reviewed paper
    pub paper_candidate: PaperCandidate,
    /// Reviewed compounds
    pub compound_candidates: Vec<CompoundCandidate>,
    /// Reviewed routes
    pub synthesis_route_candidates: Vec<SynthesisRouteCandidate>,
    /// Path returned by parse
    pub stored_document_path: String,
}

impl From<ParsedDocument> for CommitRequest {
    fn from(parsed: ParsedDocument) -> Self {
        Self {
            paper_candidate: parsed.paper_candidate,
            compound_candidates: parsed.compound_candidates,
            synthesis_route_candidates: parsed.synthesis_route_candidates,
            stored_document_path: parsed.stored_document_path,
        }
    }
}

/// Entity kind of a failed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// A compound candidate
    Compound,
    /// A synthesis route candidate
    SynthesisRoute,
}

/// A candidate that was not persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    /// What kind of candidate failed
    pub kind: ItemKind,
    /// Candidate name as submitted
    pub name: String,
    /// Why it was not persisted
    pub reason: String,
}

/// Summary of a commit
///
/// Counts only include entities that were actually written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutcome {
    /// The created paper
    pub paper: PaperView,
    /// Compounds written
    pub compounds_created: usize,
    /// Routes written
    pub synthesis_created: usize,
    /// Candidates that were dropped
    pub failures: Vec<ItemFailure>,
    /// Recovered problems with back-references
    pub warnings: Vec<String>,
    /// Id of the created paper
    #[serde(skip)]
    pub paper_id: PaperId,
}
