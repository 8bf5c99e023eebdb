//! JSON views of persisted entities
//!
//! Used for commit results, the HTTP read endpoints, and CLI JSON output.

use retort_domain::{Compound, Paper, SynthesisRoute, SynthesisStep};
use serde::{Deserialize, Serialize};

/// A paper as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperView {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub journal: String,
    pub year: i32,
    pub pdf_url: String,
    pub related_compounds: Vec<String>,
    pub contributor: Option<String>,
    pub tags: Vec<String>,
    pub created_at: u64,
}

impl From<&Paper> for PaperView {
    fn from(paper: &Paper) -> Self {
        Self {
            id: paper.id.to_string(),
            title: paper.title.clone(),
            authors: paper.authors.clone(),
            abstract_text: paper.abstract_text.clone(),
            journal: paper.journal.clone(),
            year: paper.year,
            pdf_url: paper.pdf_url.clone(),
            related_compounds: paper.related_compounds.iter().map(ToString::to_string).collect(),
            contributor: paper.contributor.clone(),
            tags: paper.tags.clone(),
            created_at: paper.created_at,
        }
    }
}

/// A compound as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundView {
    pub id: String,
    pub name: String,
    pub smiles: String,
    pub category: String,
    pub description: String,
    pub bioactivity: Vec<String>,
    pub tags: Vec<String>,
    pub related_papers: Vec<String>,
    pub synthesis_route: Option<String>,
    pub created_at: u64,
}

impl From<&Compound> for CompoundView {
    fn from(compound: &Compound) -> Self {
        Self {
            id: compound.id.to_string(),
            name: compound.name.clone(),
            smiles: compound.smiles.clone(),
            category: compound.category.clone(),
            description: compound.description.clone(),
            bioactivity: compound.bioactivity.clone(),
            tags: compound.tags.clone(),
            related_papers: compound.related_papers.iter().map(ToString::to_string).collect(),
            synthesis_route: compound.synthesis_route.map(|id| id.to_string()),
            created_at: compound.created_at,
        }
    }
}

/// One route step as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub step_number: u32,
    pub from: String,
    pub to: String,
    pub reagent: String,
    pub conditions: String,
    pub description: String,
}

impl From<&SynthesisStep> for StepView {
    fn from(step: &SynthesisStep) -> Self {
        Self {
            step_number: step.step_number,
            from: step.from.clone(),
            to: step.to.clone(),
            reagent: step.reagent.clone(),
            conditions: step.conditions.clone(),
            description: step.description.clone(),
        }
    }
}

/// A synthesis route as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRouteView {
    pub id: String,
    pub name: String,
    pub compound_id: String,
    pub created_by: Option<String>,
    pub status: String,
    pub steps: Vec<StepView>,
    pub notes: String,
    pub created_at: u64,
}

impl From<&SynthesisRoute> for SynthesisRouteView {
    fn from(route: &SynthesisRoute) -> Self {
        Self {
            id: route.id.to_string(),
            name: route.name.clone(),
            compound_id: route.compound_id.to_string(),
            created_by: route.created_by.clone(),
            status: route.status.to_string(),
            steps: route.steps.iter().map(StepView::from).collect(),
            notes: route.notes.clone(),
            created_at: route.created_at,
        }
    }
}

/// A paper with its compounds resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperDetail {
    #[serde(flatten)]
    pub paper: PaperView,
    pub compounds: Vec<CompoundView>,
}

impl PaperDetail {
    /// Pair a paper with its resolved compounds
    pub fn new(paper: &Paper, compounds: &[Compound]) -> Self {
        Self {
            paper: PaperView::from(paper),
            compounds: compounds.iter().map(CompoundView::from).collect(),
        }
    }
}

/// A compound with its papers and route resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundDetail {
    #[serde(flatten)]
    pub compound: CompoundView,
    pub papers: Vec<PaperView>,
    pub route: Option<SynthesisRouteView>,
}
