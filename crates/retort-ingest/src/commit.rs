//! Persistence of reviewed candidates
//!
//! Writes happen in a fixed order: paper, compounds, routes with their
//! compound back-references, then the paper's compound list. Only the paper
//! is mandatory; every later write is attempted independently and its
//! failure is recorded instead of aborting the commit.

use crate::config::IngestConfig;
use crate::error::CommitError;
use crate::reconcile::{reconcile, MatchKind};
use crate::types::{
    CommitOutcome, CommitRequest, CompoundCandidate, IngestContext, ItemFailure, ItemKind,
    SynthesisRouteCandidate,
};
use crate::views::PaperView;
use retort_domain::{
    Compound, EntityStore, Paper, PaperId, RouteStatus, SynthesisRoute, SynthesisRouteId,
    SynthesisStep,
};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Writes candidate batches to an `EntityStore`
pub struct Committer<S> {
    store: Arc<Mutex<S>>,
    default_category: String,
    default_route_notes: String,
}

impl<S> Committer<S>
where
    S: EntityStore,
    S::Error: Display,
{
    /// Create a committer over a shared store
    pub fn new(store: Arc<Mutex<S>>, config: &IngestConfig) -> Self {
        Self {
            store,
            default_category: config.default_category.clone(),
            default_route_notes: config.default_route_notes.clone(),
        }
    }

    /// Run one store call with the lock held only for that call
    fn with_store<T>(
        &self,
        op: impl FnOnce(&mut S) -> Result<T, S::Error>,
    ) -> Result<T, String> {
        let mut store = self
            .store
            .lock()
            .map_err(|e| format!("store lock poisoned: {}", e))?;
        op(&mut *store).map_err(|e| e.to_string())
    }

    /// Persist a reviewed batch
    pub fn commit(
        &self,
        ctx: &IngestContext,
        request: CommitRequest,
    ) -> Result<CommitOutcome, CommitError> {
        let mut paper = self.create_paper(ctx, &request)?;
        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        let mut created = Vec::with_capacity(request.compound_candidates.len());
        for candidate in &request.compound_candidates {
            match self.create_compound(candidate, paper.id) {
                Ok(compound) => created.push(compound),
                Err(reason) => {
                    warn!("Failed to create compound '{}': {}", candidate.name, reason);
                    failures.push(ItemFailure {
                        kind: ItemKind::Compound,
                        name: candidate.name.clone(),
                        reason,
                    });
                }
            }
        }

        let reconciliation = reconcile(&request.synthesis_route_candidates, &created);
        let mut synthesis_created = 0;

        for assignment in &reconciliation.assigned {
            let route = assignment.route;
            let compound = assignment.compound;
            match assignment.kind {
                MatchKind::Name => {
                    debug!("Route '{}' matched '{}' by name", route.name, compound.name)
                }
                MatchKind::Position => debug!(
                    "Route '{}' matched no compound name, using '{}'",
                    route.name, compound.name
                ),
            }

            let route_id = match self.create_route(ctx, route, compound) {
                Ok(id) => id,
                Err(reason) => {
                    warn!("Failed to create synthesis route '{}': {}", route.name, reason);
                    failures.push(ItemFailure {
                        kind: ItemKind::SynthesisRoute,
                        name: route.name.clone(),
                        reason,
                    });
                    continue;
                }
            };
            synthesis_created += 1;

            if let Err(reason) = self.with_store(|s| s.set_compound_route(compound.id, route_id)) {
                warn!(
                    "Route {} created but compound {} was not updated: {}",
                    route_id, compound.id, reason
                );
                warnings.push(format!(
                    "compound '{}' does not reference synthesis route '{}': {}",
                    compound.name, route.name, reason
                ));
            }
        }

        for route in &reconciliation.unassigned {
            warn!("Skipping synthesis route '{}': no compound was created", route.name);
            failures.push(ItemFailure {
                kind: ItemKind::SynthesisRoute,
                name: route.name.clone(),
                reason: "skipped: no compound was created to attach it to".to_string(),
            });
        }

        let compound_ids: Vec<_> = created.iter().map(|c| c.id).collect();
        match self.with_store(|s| s.set_paper_compounds(paper.id, &compound_ids)) {
            Ok(()) => paper.related_compounds = compound_ids,
            Err(reason) => {
                warn!("Paper {} compound list was not updated: {}", paper.id, reason);
                warnings.push(format!("paper does not reference its compounds: {}", reason));
            }
        }

        info!(
            "Commit complete for paper {}: {} compounds, {} routes, {} failures",
            paper.id,
            created.len(),
            synthesis_created,
            failures.len()
        );

        Ok(CommitOutcome {
            paper: PaperView::from(&paper),
            compounds_created: created.len(),
            synthesis_created,
            failures,
            warnings,
            paper_id: paper.id,
        })
    }

    fn create_paper(
        &self,
        ctx: &IngestContext,
        request: &CommitRequest,
    ) -> Result<Paper, CommitError> {
        let candidate = &request.paper_candidate;
        if candidate.title.trim().is_empty() {
            error!("Rejecting commit: paper title is empty");
            return Err(CommitError::InvalidPaper("title is required".to_string()));
        }

        let mut paper = Paper::new(candidate.title.clone(), candidate.year);
        paper.authors = candidate.authors.clone();
        paper.abstract_text = candidate.abstract_text.clone();
        paper.journal = candidate.journal.clone();
        paper.pdf_url = request.stored_document_path.clone();
        paper.contributor = ctx.contributor.clone();
        paper.tags = candidate.keywords.clone();

        let mut store = self.store.lock().map_err(|e| {
            error!("Store unavailable: {}", e);
            CommitError::StoreUnavailable(e.to_string())
        })?;
        store.create_paper(paper.clone()).map_err(|e| {
            error!("Failed to create paper '{}': {}", paper.title, e);
            CommitError::PersistenceFatal(e.to_string())
        })?;

        Ok(paper)
    }

    fn create_compound(
        &self,
        candidate: &CompoundCandidate,
        paper_id: PaperId,
    ) -> Result<Compound, String> {
        if candidate.name.trim().is_empty() {
            return Err("compound name is required".to_string());
        }

        let mut compound = Compound::new(candidate.name.clone());
        compound.smiles = candidate.possible_smiles.clone();
        compound.category = if candidate.category.trim().is_empty() {
            self.default_category.clone()
        } else {
            candidate.category.clone()
        };
        compound.description = candidate.description.clone();
        compound.bioactivity = candidate.bioactivity.clone();
        compound.tags = candidate.tags.clone();
        compound.related_papers = vec![paper_id];

        self.with_store(|s| s.create_compound(compound.clone()))?;
        Ok(compound)
    }

    fn create_route(
        &self,
        ctx: &IngestContext,
        candidate: &SynthesisRouteCandidate,
        compound: &Compound,
    ) -> Result<SynthesisRouteId, String> {
        let mut route = SynthesisRoute::new(candidate.name.clone(), compound.id);
        route.created_by = ctx.contributor.clone();
        route.status = RouteStatus::Pending;
        route.notes = if candidate.notes.trim().is_empty() {
            self.default_route_notes.clone()
        } else {
            candidate.notes.clone()
        };
        route.steps = candidate
            .steps
            .iter()
            .map(|step| SynthesisStep {
                step_number: step.step_number,
                from: step.from.clone(),
                to: step.to.clone(),
                reagent: step.reagent.clone(),
                conditions: step.conditions.clone(),
                description: step.description.clone(),
            })
            .collect();

        self.with_store(|s| s.create_synthesis_route(route))
    }
}
