//! Retort Domain Layer
//!
//! This crate contains the domain model for Retort's paper ingestion
//! pipeline. It has no external dependencies beyond `uuid` and defines the
//! persisted entities and the trait interfaces that the other layers
//! depend upon.
//!
//! ## Key Concepts
//!
//! - **Paper**: a committed research paper, owner of an ingestion batch
//! - **Compound**: a chemical compound created from a reviewed candidate
//! - **SynthesisRoute**: an ordered list of steps that produces one compound
//! - **Back-references**: `Paper::related_compounds` and
//!   `Compound::synthesis_route`, written after the primary records exist
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - Infrastructure implementations (SQLite, HTTP model providers) live in
//!   other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compound;
pub mod id;
pub mod paper;
pub mod synthesis;
pub mod traits;

// Re-exports for convenience
pub use compound::Compound;
pub use id::{CompoundId, IdParseError, PaperId, SynthesisRouteId};
pub use paper::Paper;
pub use synthesis::{RouteStatus, SynthesisRoute, SynthesisStep};
pub use traits::{CompletionProvider, CompletionRequest, EntityStore, PaperQuery};

/// Current Unix time in seconds.
///
/// Falls back to zero if the system clock is set before the epoch.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
