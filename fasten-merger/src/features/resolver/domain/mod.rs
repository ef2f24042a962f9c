//! Types shared by the resolution algorithm and its caller.

use crate::domain::models::CallableId;

/// One concrete, resolved call-graph arc. Distinct from [`crate::features::edge_harvester::HarvestedArc`]:
/// a single harvested arc with N invocation sites can resolve into any
/// number of these (virtual dispatch over M overriders × N sites), and a
/// callback arc's direction may be the reverse of the harvested arc it
/// came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedArc {
    pub source: CallableId,
    pub target: CallableId,
}

/// One call site that resolved to zero concrete callees, kept for the
/// `MergeReport::unresolved_sites` side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedSite {
    pub source: CallableId,
    pub target: CallableId,
    pub receiver_type: String,
    pub reason: &'static str,
}

/// Everything the resolution pass produced, before it's handed to the
/// output graph builder.
#[derive(Debug, Default)]
pub struct ResolutionOutcome {
    pub arcs: Vec<ResolvedArc>,
    pub dynamic_sites_unresolved: usize,
    pub sites_resolved_zero: usize,
    pub unresolved_sites: Vec<UnresolvedSite>,
}
