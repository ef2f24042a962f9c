//! Call-Graph Fetcher & Node Typing
//!
//! Loads the focal artifact's partial call graph and resolves every node
//! id it mentions to a [`Node`] (type + signature), so the resolver never
//! has to go back to the URI store mid-resolution.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::models::{CallableId, Node, PartialGraph};
use crate::domain::ports::{DependencyStore, GraphStore};
use crate::errors::{MergeError, Result};
use crate::features::uri_codec;

/// The focal partial graph plus every node's resolved type/signature.
/// A node whose URI fails to parse is dropped from `typed_nodes` but
/// left in the graph — callers treat a missing entry as "can't type
/// this node" and log accordingly rather than failing the merge.
pub struct TypedCallGraph {
    pub graph: PartialGraph,
    pub typed_nodes: HashMap<CallableId, Node>,
}

/// Fetch the focal package-version's partial graph. Split out from
/// [`type_nodes`] so the orchestrator can fold the focal artifact's own
/// internal callables into the dependency closure — the universal CHA and
/// type dictionary are built over the focal artifact plus its
/// dependencies, not the dependencies alone — before the rest of the
/// graph is typed.
pub fn fetch_focal_graph(graph_store: &dyn GraphStore, focal_package_version_id: u64) -> Result<PartialGraph> {
    graph_store
        .partial_graph(focal_package_version_id)
        .map_err(|_| MergeError::FocalGraphMissing(focal_package_version_id))
}

/// Type every node a partial graph references (internal and external
/// alike — the resolver needs both sides' types to decide how to expand
/// an edge).
pub fn type_nodes(dependency_store: &dyn DependencyStore, graph: PartialGraph) -> Result<TypedCallGraph> {
    let all_nodes: Vec<CallableId> = graph
        .internal_nodes
        .iter()
        .chain(graph.external_nodes.iter())
        .copied()
        .collect();

    let uris = dependency_store.uris_of(&all_nodes);
    let mut typed_nodes = HashMap::with_capacity(uris.len());
    for (callable, uri) in uris {
        match uri_codec::parse(&uri) {
            Ok(node) => {
                typed_nodes.insert(callable, node);
            }
            Err(err) => {
                warn!(callable, uri, error = %err, "dropping node with malformed URI from focal graph");
            }
        }
    }

    Ok(TypedCallGraph { graph, typed_nodes })
}

/// Convenience composition of [`fetch_focal_graph`] + [`type_nodes`] for
/// callers that don't need to fold the focal graph's internal callables
/// into a closure first (e.g. tests exercising node typing in isolation).
pub fn fetch_and_type(
    graph_store: &dyn GraphStore,
    dependency_store: &dyn DependencyStore,
    focal_package_version_id: u64,
) -> Result<TypedCallGraph> {
    let graph = fetch_focal_graph(graph_store, focal_package_version_id)?;
    type_nodes(dependency_store, graph)
}
