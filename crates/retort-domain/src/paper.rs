//! Paper entity - the owner of an ingestion batch

use crate::{CompoundId, PaperId};

/// A committed research paper
///
/// The paper is created first during a commit; `related_compounds` is a
/// back-reference written once, after the compounds of the same batch exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    /// Unique identifier
    pub id: PaperId,

    /// Paper title (required, non-empty)
    pub title: String,

    /// Author names in publication order
    pub authors: Vec<String>,

    /// Abstract text
    pub abstract_text: String,

    /// Journal or venue
    pub journal: String,

    /// Publication year
    pub year: i32,

    /// Path of the stored source PDF
    pub pdf_url: String,

    /// Compounds created from the same ingestion batch
    pub related_compounds: Vec<CompoundId>,

    /// User who contributed the paper
    pub contributor: Option<String>,

    /// Free-form tags (seeded from the paper's keywords)
    pub tags: Vec<String>,

    /// Creation timestamp (Unix seconds)
    pub created_at: u64,
}

impl Paper {
    /// Create a paper with a fresh id and no compound references
    pub fn new(title: impl Into<String>, year: i32) -> Self {
        Self {
            id: PaperId::new(),
            title: title.into(),
            authors: Vec::new(),
            abstract_text: String::new(),
            journal: String::new(),
            year,
            pdf_url: String::new(),
            related_compounds: Vec::new(),
            contributor: None,
            tags: Vec::new(),
            created_at: crate::unix_now(),
        }
    }
}
