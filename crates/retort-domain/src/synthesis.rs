//! Synthesis route entity

use crate::{CompoundId, SynthesisRouteId};
use std::fmt;
use std::str::FromStr;

/// Review status of a synthesis route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RouteStatus {
    /// Created from extraction, awaiting approval
    #[default]
    Pending,
    /// Approved by a curator
    Approved,
}

impl RouteStatus {
    /// Storage/wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Pending => "pending",
            RouteStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RouteStatus::Pending),
            "approved" => Ok(RouteStatus::Approved),
            other => Err(format!("unknown route status: {}", other)),
        }
    }
}

/// One step of a synthesis route
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SynthesisStep {
    /// 1-based position in the route
    pub step_number: u32,
    /// Precursor (SMILES or name)
    pub from: String,
    /// Product
    pub to: String,
    /// Reagent used
    pub reagent: String,
    /// Reaction conditions
    pub conditions: String,
    /// Free-text description
    pub description: String,
}

/// A synthesis route producing exactly one compound
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRoute {
    /// Unique identifier
    pub id: SynthesisRouteId,

    /// Route name
    pub name: String,

    /// The compound this route produces; must exist in the store
    pub compound_id: CompoundId,

    /// User who created the route
    pub created_by: Option<String>,

    /// Review status
    pub status: RouteStatus,

    /// Ordered steps
    pub steps: Vec<SynthesisStep>,

    /// Curator notes
    pub notes: String,

    /// Creation timestamp (Unix seconds)
    pub created_at: u64,
}

impl SynthesisRoute {
    /// Create a pending route for the given compound
    pub fn new(name: impl Into<String>, compound_id: CompoundId) -> Self {
        Self {
            id: SynthesisRouteId::new(),
            name: name.into(),
            compound_id,
            created_by: None,
            status: RouteStatus::Pending,
            steps: Vec::new(),
            notes: String::new(),
            created_at: crate::unix_now(),
        }
    }
}
