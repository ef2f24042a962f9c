/*
 * Domain Ports - Interfaces for the external collaborators
 *
 * HEXAGONAL ARCHITECTURE:
 * - Domain defines interfaces
 * - An infrastructure adapter (e.g. `testing::memory_stores`, or a real
 *   Maven/metadata-store client in a downstream crate) implements them
 * - Dependency Inversion Principle
 *
 * The merger is a single-threaded cooperative pipeline and store access
 * is synchronous request/response — there is no internal suspension
 * point, so these ports are plain (non-async) trait methods. A caller
 * that only has an async store client is expected to block on it at the
 * adapter boundary; the bytecode analyzer, the Maven resolver, and the
 * messaging ingress that populate these stores are out of scope here.
 */

use crate::domain::models::{CallableId, DependencyId, InvocationSite};
use crate::domain::PartialGraph;
use crate::errors::Result;

/// One row of hierarchy metadata: a module and the super-types its owned
/// types declare. A "module" in this context is whatever unit the
/// dependency store batches hierarchy facts by; multiple types in the same
/// module may contribute to the same row in a real adapter, but each row
/// already describes a single namespace's super-classes and
/// super-interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRow {
    pub type_namespace: String,
    pub super_classes: Vec<String>,
    pub super_interfaces: Vec<String>,
}

/// Port: dependency resolution and metadata lookup.
pub trait DependencyStore: Send + Sync {
    /// Deduplicate `coordinates` and return the subset present under the
    /// target forge. Missing coordinates are silently dropped — the merge
    /// degrades to a smaller closure, it never fails on this call.
    fn resolve_ids(&self, coordinates: &[String]) -> Result<Vec<DependencyId>>;

    /// Internal (non-external) callables belonging to a single
    /// dependency's partial graph. Called once per dependency by the
    /// orchestrator so that a failure can be attributed to that dependency,
    /// logged, and counted in `MergeReport::dependencies_dropped` —
    /// failures per-dependency are logged and skipped, never fatal.
    fn callables_of(&self, dep: DependencyId) -> Result<Vec<CallableId>>;

    /// Batched URI lookup for a set of callables.
    fn uris_of(&self, callables: &[CallableId]) -> Vec<(CallableId, String)>;

    /// One hierarchy row per module that owns at least one of `callables`.
    fn hierarchy_of(&self, callables: &[CallableId]) -> Vec<HierarchyRow>;
}

/// Port: fetch a partial call graph by package-version id.
pub trait GraphStore: Send + Sync {
    fn partial_graph(&self, package_version_id: DependencyId) -> Result<PartialGraph>;
}

/// One harvested arc's raw wire shape, before it's paired with an
/// `InvocationSite` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSites {
    pub source: CallableId,
    pub target: CallableId,
    pub sites: Vec<InvocationSite>,
}

/// Port: batched invocation-site lookup for a set of (source, target)
/// edges.
pub trait EdgeMetadataStore: Send + Sync {
    fn edges(&self, predicate: &[(CallableId, CallableId)]) -> Result<Vec<EdgeSites>>;
}
