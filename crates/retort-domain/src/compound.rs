//! Compound entity

use crate::{CompoundId, PaperId, SynthesisRouteId};

/// A chemical compound
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    /// Unique identifier
    pub id: CompoundId,

    /// Common name (required, non-empty)
    pub name: String,

    /// SMILES string, possibly empty when the source gave none
    pub smiles: String,

    /// Chemical class, e.g. "Pyrimidine"
    pub category: String,

    /// Plain-language summary
    pub description: String,

    /// Reported activities, e.g. "Antiviral"
    pub bioactivity: Vec<String>,

    /// Free-form tags
    pub tags: Vec<String>,

    /// Papers this compound was extracted from
    pub related_papers: Vec<PaperId>,

    /// Route that produces this compound (last write wins)
    pub synthesis_route: Option<SynthesisRouteId>,

    /// Creation timestamp (Unix seconds)
    pub created_at: u64,
}

impl Compound {
    /// Create a compound with a fresh id and no references
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CompoundId::new(),
            name: name.into(),
            smiles: String::new(),
            category: String::new(),
            description: String::new(),
            bioactivity: Vec::new(),
            tags: Vec::new(),
            related_papers: Vec::new(),
            synthesis_route: None,
            created_at: crate::unix_now(),
        }
    }
}
