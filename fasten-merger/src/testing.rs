//! In-memory fakes for the three domain ports, used by this crate's own
//! tests and available to downstream crates under the `testing` feature
//! for wiring up a quick local smoke test without a real metadata/graph
//! store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::models::{CallableId, DependencyId, InvocationSite, PartialGraph};
use crate::domain::ports::{DependencyStore, EdgeMetadataStore, EdgeSites, GraphStore, HierarchyRow};
use crate::errors::{MergeError, Result};

#[derive(Debug, Default, Clone)]
pub struct InMemoryDependencyStore {
    inner: Arc<Mutex<DependencyStoreState>>,
}

#[derive(Debug, Default)]
struct DependencyStoreState {
    coordinate_ids: HashMap<String, DependencyId>,
    dependency_callables: HashMap<DependencyId, Vec<CallableId>>,
    uris: HashMap<CallableId, String>,
    hierarchy: Vec<HierarchyRow>,
    unavailable: bool,
    failing_dependencies: std::collections::HashSet<DependencyId>,
}

impl InMemoryDependencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coordinate(self, coordinate: &str, id: DependencyId) -> Self {
        self.inner
            .lock()
            .unwrap()
            .coordinate_ids
            .insert(coordinate.to_string(), id);
        self
    }

    pub fn with_dependency_callables(self, dep: DependencyId, callables: Vec<CallableId>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .dependency_callables
            .insert(dep, callables);
        self
    }

    pub fn with_uri(self, callable: CallableId, uri: &str) -> Self {
        self.inner.lock().unwrap().uris.insert(callable, uri.to_string());
        self
    }

    pub fn with_hierarchy_row(self, row: HierarchyRow) -> Self {
        self.inner.lock().unwrap().hierarchy.push(row);
        self
    }

    pub fn with_unavailable(self) -> Self {
        self.inner.lock().unwrap().unavailable = true;
        self
    }

    /// Make `callables_of(dep)` fail for this one dependency id, leaving
    /// every other method (including `resolve_ids` for the focal
    /// coordinate) unaffected — for exercising per-dependency degradation
    /// without taking the whole store offline.
    pub fn with_failing_dependency(self, dep: DependencyId) -> Self {
        self.inner.lock().unwrap().failing_dependencies.insert(dep);
        self
    }
}

impl DependencyStore for InMemoryDependencyStore {
    fn resolve_ids(&self, coordinates: &[String]) -> Result<Vec<DependencyId>> {
        let state = self.inner.lock().unwrap();
        if state.unavailable {
            return Err(MergeError::StoreUnavailable("dependency store offline".into()));
        }
        Ok(coordinates
            .iter()
            .filter_map(|c| state.coordinate_ids.get(c).copied())
            .collect())
    }

    fn callables_of(&self, dep: DependencyId) -> Result<Vec<CallableId>> {
        let state = self.inner.lock().unwrap();
        if state.unavailable {
            return Err(MergeError::StoreUnavailable("dependency store offline".into()));
        }
        if state.failing_dependencies.contains(&dep) {
            return Err(MergeError::DependencyFetchFailed(dep));
        }
        Ok(state.dependency_callables.get(&dep).cloned().unwrap_or_default())
    }

    fn uris_of(&self, callables: &[CallableId]) -> Vec<(CallableId, String)> {
        let state = self.inner.lock().unwrap();
        callables
            .iter()
            .filter_map(|c| state.uris.get(c).map(|uri| (*c, uri.clone())))
            .collect()
    }

    fn hierarchy_of(&self, callables: &[CallableId]) -> Vec<HierarchyRow> {
        let state = self.inner.lock().unwrap();
        let _ = callables;
        state.hierarchy.clone()
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryGraphStore {
    graphs: Arc<Mutex<HashMap<DependencyId, PartialGraph>>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(self, dep: DependencyId, graph: PartialGraph) -> Self {
        self.graphs.lock().unwrap().insert(dep, graph);
        self
    }
}

impl GraphStore for InMemoryGraphStore {
    fn partial_graph(&self, package_version_id: DependencyId) -> Result<PartialGraph> {
        self.graphs
            .lock()
            .unwrap()
            .get(&package_version_id)
            .cloned()
            .ok_or(MergeError::FocalGraphMissing(package_version_id))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryEdgeMetadataStore {
    edges: Arc<Mutex<HashMap<(CallableId, CallableId), Vec<InvocationSite>>>>,
}

impl InMemoryEdgeMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sites(self, source: CallableId, target: CallableId, sites: Vec<InvocationSite>) -> Self {
        self.edges.lock().unwrap().insert((source, target), sites);
        self
    }
}

impl EdgeMetadataStore for InMemoryEdgeMetadataStore {
    fn edges(&self, predicate: &[(CallableId, CallableId)]) -> Result<Vec<EdgeSites>> {
        let state = self.edges.lock().unwrap();
        Ok(predicate
            .iter()
            .filter_map(|&(source, target)| {
                state.get(&(source, target)).map(|sites| EdgeSites {
                    source,
                    target,
                    sites: sites.clone(),
                })
            })
            .collect())
    }
}
