//! Top-level orchestration: wires dependency resolution, universal CHA
//! and type-dictionary construction, focal-graph fetching, edge
//! harvesting, and resolution into one merged output graph.

use tracing::{info, info_span, warn};

use crate::config::{MergeConfig, MissingDepPolicy};
use crate::domain::models::CallableId;
use crate::domain::ports::{DependencyStore, EdgeMetadataStore, GraphStore};
use crate::errors::{MergeError, Result};
use crate::features::call_graph::{fetch_focal_graph, type_nodes};
use crate::features::cha::build_universal_cha;
use crate::features::edge_harvester::harvest;
use crate::features::merge_graph::{MergedGraph, MergedGraphBuilder};
use crate::features::resolver::{resolve, UnresolvedSite};
use crate::features::type_dictionary::build_type_dictionary;

/// Cooperative cancellation, polled between phases. A caller driving a
/// long merge from a UI or a job scheduler implements this to let a user
/// abort mid-merge instead of waiting for the whole dependency closure
/// to resolve.
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

/// Default token for callers with no cancellation source.
pub struct NeverCancel;

impl CancellationToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Non-fatal counters accumulated over the course of a merge. Every
/// field here corresponds to a failure mode that degrades the output
/// instead of aborting it — a fatal failure is always a `MergeError`
/// instead.
#[derive(Debug, Default, Clone)]
pub struct MergeReport {
    /// Dependencies that failed to resolve or whose callables couldn't
    /// be fetched, and were skipped.
    pub dependencies_dropped: usize,
    /// Callables dropped from the type dictionary because their URI
    /// failed to parse.
    pub callables_dropped: usize,
    /// Dynamic-dispatch sites skipped under `DynamicSitePolicy::Warn`/`Drop`.
    pub dynamic_sites_unresolved: usize,
    /// Sites that resolved to zero concrete callees (not the same as a
    /// dynamic site — these had a determinable receiver but no matching
    /// implementation in the closure).
    pub sites_resolved_zero: usize,
    /// Detail for every site counted in `sites_resolved_zero`.
    pub unresolved_sites: Vec<UnresolvedSite>,
}

/// Validate a `group:artifact:version` coordinate by splitting on the
/// first and last `:` — the artifact component may itself contain `:`
/// (e.g. a Maven classifier), so `group:a:b:version` is a valid
/// coordinate with `artifact = "a:b"`, not a four-component rejection.
fn validate_coordinate(coordinate: &str) -> Result<()> {
    let first = coordinate.find(':');
    let last = coordinate.rfind(':');
    let (Some(first), Some(last)) = (first, last) else {
        return Err(MergeError::CoordinateMalformed(coordinate.to_string()));
    };
    if first == last {
        return Err(MergeError::CoordinateMalformed(coordinate.to_string()));
    }

    let group = &coordinate[..first];
    let artifact = &coordinate[first + 1..last];
    let version = &coordinate[last + 1..];
    if group.is_empty() || artifact.is_empty() || version.is_empty() {
        return Err(MergeError::CoordinateMalformed(coordinate.to_string()));
    }
    Ok(())
}

/// Merge the focal artifact's partial call graph with its dependency
/// closure, resolving every external/self-loop arc via the universal
/// CHA and type dictionary.
pub fn merge(
    config: MergeConfig,
    cancellation: &dyn CancellationToken,
    dependency_store: &dyn DependencyStore,
    graph_store: &dyn GraphStore,
    edge_store: &dyn EdgeMetadataStore,
    focal_coordinate: &str,
    dependency_coordinates: &[String],
) -> Result<(MergedGraph, MergeReport)> {
    validate_coordinate(focal_coordinate)?;
    let mut report = MergeReport::default();

    let focal_ids = dependency_store.resolve_ids(&[focal_coordinate.to_string()])?;
    let focal_id = *focal_ids
        .first()
        .ok_or_else(|| MergeError::CoordinateMalformed(focal_coordinate.to_string()))?;

    // Phase 1: closure construction — fetch the focal graph, resolve the
    // dependency closure, and fold the focal artifact's own internal
    // callables in alongside the dependencies' (see the comment below on
    // why the focal artifact itself belongs in the closure).
    let (focal_graph, closure_callables) = info_span!("closure_construction", focal_id).in_scope(
        || -> Result<_> {
            info!(focal_id, "fetching focal call graph");
            let focal_graph = fetch_focal_graph(graph_store, focal_id)?;

            info!(focal_coordinate, "resolving dependency closure");
            let dep_ids = dependency_store.resolve_ids(dependency_coordinates)?;
            report.dependencies_dropped += dependency_coordinates.len().saturating_sub(dep_ids.len());

            // The closure that feeds the universal CHA and type dictionary
            // includes the focal artifact's own internal callables, not just
            // its dependencies — otherwise a virtual call that dispatches
            // back into the focal artifact itself (a self-loop, or a
            // super-constructor defined locally) could never resolve.
            let mut closure_callables: Vec<CallableId> =
                focal_graph.internal_nodes.iter().copied().collect();
            for dep in &dep_ids {
                if cancellation.is_cancelled() {
                    return Err(MergeError::Cancelled);
                }
                match dependency_store.callables_of(*dep) {
                    Ok(callables) => closure_callables.extend(callables),
                    Err(err) => {
                        warn!(dependency = dep, error = %err, "dropping dependency");
                        report.dependencies_dropped += 1;
                        if config.missing_dep_policy == MissingDepPolicy::Fail {
                            return Err(MergeError::DependencyFetchFailed(*dep));
                        }
                    }
                }
            }

            Ok((focal_graph, closure_callables))
        },
    )?;

    if cancellation.is_cancelled() {
        return Err(MergeError::Cancelled);
    }

    // Phase 2: CHA build.
    let cha = info_span!("cha_build", callables = closure_callables.len()).in_scope(|| {
        info!(callables = closure_callables.len(), "building universal hierarchy");
        let hierarchy = dependency_store.hierarchy_of(&closure_callables);
        build_universal_cha(&hierarchy)
    });

    // Phase 3: type dictionary build.
    let dict_outcome = info_span!("dictionary_build").in_scope(|| {
        info!("building type dictionary");
        let uris = dependency_store.uris_of(&closure_callables);
        build_type_dictionary(&uris)
    });
    report.callables_dropped += dict_outcome.dropped;

    if cancellation.is_cancelled() {
        return Err(MergeError::Cancelled);
    }

    // Phase 4: harvesting — type the focal graph's nodes and select the
    // arcs that need resolution.
    let (typed, harvested) = info_span!("harvesting").in_scope(|| -> Result<_> {
        info!("typing focal call graph nodes");
        let typed = type_nodes(dependency_store, focal_graph)?;

        let harvested = harvest(&typed.graph, edge_store)?;
        info!(arcs = harvested.len(), "harvested arcs needing resolution");
        Ok((typed, harvested))
    })?;

    if cancellation.is_cancelled() {
        return Err(MergeError::Cancelled);
    }

    // Phase 5: resolution — dispatch every harvested arc's sites and
    // assemble the final merged graph.
    let graph = info_span!("resolution").in_scope(|| -> Result<MergedGraph> {
        let resolution = resolve(&typed, &cha, &dict_outcome.dictionary, &harvested, config.dynamic_site_policy)?;
        report.dynamic_sites_unresolved += resolution.dynamic_sites_unresolved;
        report.sites_resolved_zero += resolution.sites_resolved_zero;
        report.unresolved_sites.extend(resolution.unresolved_sites);

        let mut builder = MergedGraphBuilder::new();
        for node in typed.graph.internal_nodes.iter().chain(typed.graph.external_nodes.iter()) {
            builder.add_node(*node);
        }
        for (source, target) in typed.graph.edge_endpoints() {
            if !typed.graph.is_external(source) && !typed.graph.is_external(target) {
                builder.add_arc(source, target);
            }
        }
        for arc in resolution.arcs {
            builder.add_arc(arc.source, arc.target);
        }

        let graph = builder.build();
        info!(nodes = graph.node_count(), arcs = graph.arc_count(), "merge complete");
        Ok(graph)
    })?;

    Ok((graph, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{InvocationKind, InvocationSite, PartialGraph};
    use crate::domain::ports::HierarchyRow;
    use crate::testing::{InMemoryDependencyStore, InMemoryEdgeMetadataStore, InMemoryGraphStore};

    #[test]
    fn accepts_a_coordinate_whose_artifact_contains_a_colon() {
        assert!(validate_coordinate("g:a:b:1.0").is_ok());
    }

    #[test]
    fn rejects_malformed_focal_coordinate() {
        let dep = InMemoryDependencyStore::new();
        let graph = InMemoryGraphStore::new();
        let edges = InMemoryEdgeMetadataStore::new();
        let err = merge(
            MergeConfig::default(),
            &NeverCancel,
            &dep,
            &graph,
            &edges,
            "not-a-coordinate",
            &[],
        )
        .unwrap_err();
        assert_eq!(err.category(), "coordinate_malformed");
    }

    #[test]
    fn end_to_end_virtual_dispatch_merge() {
        // Focal artifact calls an external interface method virtually;
        // one dependency provides the interface, another provides an
        // override.
        let mut focal_graph = PartialGraph::new();
        focal_graph.add_internal(1);
        focal_graph.add_external(2);
        focal_graph.add_edge(1, 2);

        let dep_store = InMemoryDependencyStore::new()
            .with_coordinate("g:focal:1.0", 100)
            .with_coordinate("g:lib:1.0", 200)
            .with_dependency_callables(200, vec![2, 3])
            .with_uri(2, "/p/Iface.foo()V")
            .with_uri(3, "/p/Impl.foo()V")
            .with_hierarchy_row(HierarchyRow {
                type_namespace: "/p/Impl".to_string(),
                super_classes: vec![],
                super_interfaces: vec!["/p/Iface".to_string()],
            });

        let graph_store = InMemoryGraphStore::new().with_graph(100, focal_graph);
        let edge_store = InMemoryEdgeMetadataStore::new().with_sites(
            1,
            2,
            vec![InvocationSite::new(5, InvocationKind::Interface, "/p/Iface")],
        );

        let (graph, report) = merge(
            MergeConfig::default(),
            &NeverCancel,
            &dep_store,
            &graph_store,
            &edge_store,
            "g:focal:1.0",
            &["g:lib:1.0".to_string()],
        )
        .unwrap();

        assert!(graph.arcs().any(|(s, t)| s == 1 && t == 3));
        assert_eq!(report.dependencies_dropped, 0);
    }

    #[test]
    fn missing_dep_policy_skip_drops_the_dependency_and_continues() {
        let mut focal_graph = PartialGraph::new();
        focal_graph.add_internal(1);
        let dep_store = InMemoryDependencyStore::new()
            .with_coordinate("g:focal:1.0", 100)
            .with_coordinate("g:broken:1.0", 201)
            .with_failing_dependency(201);
        let graph_store = InMemoryGraphStore::new().with_graph(100, focal_graph);
        let edge_store = InMemoryEdgeMetadataStore::new();

        let (_, report) = merge(
            MergeConfig::default(),
            &NeverCancel,
            &dep_store,
            &graph_store,
            &edge_store,
            "g:focal:1.0",
            &["g:broken:1.0".to_string()],
        )
        .unwrap();

        assert_eq!(report.dependencies_dropped, 1);
    }

    #[test]
    fn missing_dep_policy_fail_aborts_the_merge() {
        let mut focal_graph = PartialGraph::new();
        focal_graph.add_internal(1);
        let dep_store = InMemoryDependencyStore::new()
            .with_coordinate("g:focal:1.0", 100)
            .with_coordinate("g:broken:1.0", 201)
            .with_failing_dependency(201);
        let graph_store = InMemoryGraphStore::new().with_graph(100, focal_graph);
        let edge_store = InMemoryEdgeMetadataStore::new();

        let config = MergeConfig {
            missing_dep_policy: MissingDepPolicy::Fail,
            ..MergeConfig::default()
        };
        let err = merge(
            config,
            &NeverCancel,
            &dep_store,
            &graph_store,
            &edge_store,
            "g:focal:1.0",
            &["g:broken:1.0".to_string()],
        )
        .unwrap_err();

        assert_eq!(err.category(), "dependency_fetch_failed");
    }
}
