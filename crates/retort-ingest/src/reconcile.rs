//! Matching route candidates to created compounds

use crate::types::SynthesisRouteCandidate;
use retort_domain::Compound;

/// How a route found its compound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The compound's name occurs in the route's name
    Name,
    /// No name matched; the first compound was used
    Position,
}

/// A route paired with the compound it will be attached to
#[derive(Debug, Clone, PartialEq)]
pub struct RouteAssignment<'a> {
    /// The route candidate
    pub route: &'a SynthesisRouteCandidate,
    /// The chosen compound
    pub compound: &'a Compound,
    /// How the compound was chosen
    pub kind: MatchKind,
}

/// Result of reconciling a batch of routes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciliation<'a> {
    /// Routes with a compound, in input order
    pub assigned: Vec<RouteAssignment<'a>>,
    /// Routes that have no compound to attach to
    pub unassigned: Vec<&'a SynthesisRouteCandidate>,
}

/// Assign each route to one of `compounds`
///
/// `compounds` must hold only successfully created compounds, in creation
/// order. A compound whose lowercase name is a substring of the route's
/// lowercase name wins; the earliest such compound breaks ties. Names are
/// compared as stored, without trimming. Compounds with empty names never
/// match by name. Without a name match the first
/// compound is used; with no compounds the route is unassigned.
pub fn reconcile<'a>(
    routes: &'a [SynthesisRouteCandidate],
    compounds: &'a [Compound],
) -> Reconciliation<'a> {
    let lowered: Vec<String> = compounds.iter().map(|c| c.name.to_lowercase()).collect();
    let mut result = Reconciliation::default();

    for route in routes {
        let route_name = route.name.to_lowercase();

        let by_name = lowered
            .iter()
            .position(|name| !name.is_empty() && route_name.contains(name.as_str()));

        match (by_name, compounds.first()) {
            (Some(idx), _) => result.assigned.push(RouteAssignment {
                route,
                compound: &compounds[idx],
                kind: MatchKind::Name,
            }),
            (None, Some(first)) => result.assigned.push(RouteAssignment {
                route,
                compound: first,
                kind: MatchKind::Position,
            }),
            (None, None) => result.unassigned.push(route),
        }
    }

    result
}
