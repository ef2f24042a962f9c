//! Edge Harvester
//!
//! Selects the subset of a partial graph's arcs that the resolver needs
//! to look at: every arc touching an external node, plus self-loops
//! (`source == target`), then fetches each arc's `InvocationSite` list
//! in one batched call.

use crate::domain::models::{CallableId, InvocationSite, PartialGraph};
use crate::domain::ports::EdgeMetadataStore;
use crate::errors::Result;

/// One harvested arc paired with the invocation sites that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedArc {
    pub source: CallableId,
    pub target: CallableId,
    pub sites: Vec<InvocationSite>,
}

/// `source`/`target` pairs worth resolving: anything touching an
/// external node, or a self-loop. Output is sorted by `(source,
/// target)` so downstream stages (and any snapshot test) see a
/// deterministic order regardless of the graph's internal hash-map
/// iteration order.
pub fn harvest(graph: &PartialGraph, edge_store: &dyn EdgeMetadataStore) -> Result<Vec<HarvestedArc>> {
    let mut predicate: Vec<(CallableId, CallableId)> = graph
        .edge_endpoints()
        .filter(|&(source, target)| {
            source == target || graph.is_external(source) || graph.is_external(target)
        })
        .collect();
    predicate.sort_unstable();
    predicate.dedup();

    let edge_sites = edge_store.edges(&predicate)?;

    let mut arcs: Vec<HarvestedArc> = edge_sites
        .into_iter()
        .map(|e| HarvestedArc {
            source: e.source,
            target: e.target,
            sites: e.sites,
        })
        .collect();
    arcs.sort_unstable_by_key(|a| (a.source, a.target));

    Ok(arcs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::InvocationKind;
    use crate::testing::InMemoryEdgeMetadataStore;

    #[test]
    fn harvests_only_external_and_self_loop_arcs() {
        let mut graph = PartialGraph::new();
        graph.add_internal(1);
        graph.add_internal(2);
        graph.add_external(3);
        graph.add_edge(1, 2); // both internal, not harvested
        graph.add_edge(1, 3); // touches external, harvested
        graph.add_edge(2, 2); // self-loop, harvested

        let site = InvocationSite::new(10, InvocationKind::Virtual, "/p/R");
        let store = InMemoryEdgeMetadataStore::new()
            .with_sites(1, 3, vec![site.clone()])
            .with_sites(2, 2, vec![site]);

        let arcs = harvest(&graph, &store).unwrap();
        assert_eq!(arcs.len(), 2);
        assert!(arcs.iter().all(|a| a.source != 1 || a.target != 2));
    }

    #[test]
    fn output_is_sorted_deterministically() {
        let mut graph = PartialGraph::new();
        graph.add_external(5);
        graph.add_internal(1);
        graph.add_edge(1, 5);
        graph.add_edge(3, 3);

        let site = InvocationSite::new(1, InvocationKind::Static, "/p/R");
        let store = InMemoryEdgeMetadataStore::new()
            .with_sites(1, 5, vec![site.clone()])
            .with_sites(3, 3, vec![site]);

        let arcs = harvest(&graph, &store).unwrap();
        let keys: Vec<_> = arcs.iter().map(|a| (a.source, a.target)).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }
}
