/*
 * fasten-merger - Cross-artifact call-graph merger
 *
 * Feature-First Hexagonal Architecture:
 * - domain/    : Pure data model + store ports (Node, PartialGraph, CHA types)
 * - features/  : Vertical slices (uri_codec, cha, type_dictionary, call_graph,
 *                edge_harvester, resolver, merge_graph)
 * - application/ : Orchestration (the `merge` use case)
 * - config/    : Operational knobs (dynamic-site-policy, missing-dep-policy)
 *
 * Stitches per-artifact partial call graphs into one resolved,
 * cross-artifact call graph using Class Hierarchy Analysis over the
 * union of a package's transitive dependency closure.
 */

#![allow(clippy::too_many_arguments)]

/// Pure domain model: `Node`, `PartialGraph`, `InvocationSite`, and the
/// store ports (`DependencyStore`, `GraphStore`, `EdgeMetadataStore`) that
/// infrastructure adapters implement.
pub mod domain;

/// Feature modules: URI codec, universal CHA, type dictionary, call-graph
/// typing, edge harvester, resolver, merged output graph.
pub mod features;

/// Top-level orchestration (the `merge` use case) and the non-fatal
/// `MergeReport` side channel.
pub mod application;

/// Operational knobs: `dynamic-site-policy`, `missing-dep-policy`,
/// `intern-type-uris`.
pub mod config;

/// Error types shared across the crate.
pub mod errors;

/// In-memory fakes for the three store ports, used by this crate's own
/// tests and exposed to downstream crates under the `testing` feature.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use application::{merge, CancellationToken, MergeReport, NeverCancel};
pub use config::{DynamicSitePolicy, MergeConfig, MissingDepPolicy};
pub use domain::{
    CallableId, DependencyId, DependencyStore, EdgeMetadataStore, GraphStore, HierarchyRow,
    InvocationKind, InvocationSite, Node, PartialGraph, Signature, TypeUri,
};
pub use errors::{MalformedUri, MergeError, Result};
pub use features::cha::UniversalCha;
pub use features::merge_graph::{MergedGraph, MergedGraphBuilder, WireGraph};
pub use features::type_dictionary::TypeDictionary;
