//! fasten-merger CLI
//!
//! Drives a merge from a focal coordinate, a dependency coordinate list,
//! and three local JSON fixture files standing in for the real
//! `DependencyStore`/`GraphStore`/`EdgeMetadataStore` (the messaging
//! ingress, Maven resolver, and metadata/graph blob stores are out of
//! scope for this crate).
//!
//! # Usage
//!
//! ```bash
//! fasten-merger-cli \
//!     --focal g:focal:1.0 \
//!     --dependency g:lib:1.0 \
//!     --dependency-store fixtures/deps.json \
//!     --graph-store fixtures/graphs.json \
//!     --edge-store fixtures/edges.json \
//!     --dynamic-site-policy warn \
//!     --output merged.json
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;

use fasten_merger::application::{merge, NeverCancel};
use fasten_merger::config::MergeConfig;
use fasten_merger::domain::models::{CallableId, DependencyId, InvocationSite, PartialGraph};
use fasten_merger::domain::ports::{
    DependencyStore, EdgeMetadataStore, EdgeSites, GraphStore, HierarchyRow,
};
use fasten_merger::errors::{MergeError, Result};

#[derive(Parser)]
#[command(name = "fasten-merger-cli")]
#[command(about = "Merge a focal artifact's partial call graph with its dependency closure", long_about = None)]
struct Cli {
    /// Focal coordinate, `group:artifact:version`.
    #[arg(long)]
    focal: String,

    /// Dependency coordinate(s). Repeat the flag for more than one.
    #[arg(long = "dependency")]
    dependencies: Vec<String>,

    /// JSON fixture backing the `DependencyStore` port.
    #[arg(long)]
    dependency_store: PathBuf,

    /// JSON fixture backing the `GraphStore` port.
    #[arg(long)]
    graph_store: PathBuf,

    /// JSON fixture backing the `EdgeMetadataStore` port.
    #[arg(long)]
    edge_store: PathBuf,

    /// `warn` (default), `drop`, or `fail`.
    #[arg(long)]
    dynamic_site_policy: Option<String>,

    /// `skip` (default) or `fail`.
    #[arg(long)]
    missing_dep_policy: Option<String>,

    /// Write the merged graph's wire form here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

/// On-disk shape of the `DependencyStore` fixture.
#[derive(Deserialize)]
struct DependencyStoreFixture {
    coordinate_ids: HashMap<String, DependencyId>,
    dependency_callables: HashMap<DependencyId, Vec<CallableId>>,
    uris: HashMap<CallableId, String>,
    #[serde(default)]
    hierarchy: Vec<HierarchyRowFixture>,
}

#[derive(Deserialize)]
struct HierarchyRowFixture {
    type_namespace: String,
    #[serde(default)]
    super_classes: Vec<String>,
    #[serde(default)]
    super_interfaces: Vec<String>,
}

struct JsonDependencyStore {
    fixture: DependencyStoreFixture,
}

impl DependencyStore for JsonDependencyStore {
    fn resolve_ids(&self, coordinates: &[String]) -> Result<Vec<DependencyId>> {
        Ok(coordinates
            .iter()
            .filter_map(|c| self.fixture.coordinate_ids.get(c).copied())
            .collect())
    }

    fn callables_of(&self, dep: DependencyId) -> Result<Vec<CallableId>> {
        Ok(self
            .fixture
            .dependency_callables
            .get(&dep)
            .cloned()
            .unwrap_or_default())
    }

    fn uris_of(&self, callables: &[CallableId]) -> Vec<(CallableId, String)> {
        callables
            .iter()
            .filter_map(|c| self.fixture.uris.get(c).map(|uri| (*c, uri.clone())))
            .collect()
    }

    fn hierarchy_of(&self, _callables: &[CallableId]) -> Vec<HierarchyRow> {
        self.fixture
            .hierarchy
            .iter()
            .map(|row| HierarchyRow {
                type_namespace: row.type_namespace.clone(),
                super_classes: row.super_classes.clone(),
                super_interfaces: row.super_interfaces.clone(),
            })
            .collect()
    }
}

/// On-disk shape of the `GraphStore` fixture: one partial graph per
/// package-version id.
#[derive(Deserialize)]
struct GraphStoreFixture {
    graphs: HashMap<DependencyId, PartialGraphFixture>,
}

#[derive(Deserialize)]
struct PartialGraphFixture {
    internal_nodes: Vec<CallableId>,
    external_nodes: Vec<CallableId>,
    /// `[[source, target], ...]`, mirroring the output wire shape.
    #[serde(default)]
    successors: Vec<[CallableId; 2]>,
}

struct JsonGraphStore {
    fixture: GraphStoreFixture,
}

impl GraphStore for JsonGraphStore {
    fn partial_graph(&self, package_version_id: DependencyId) -> Result<PartialGraph> {
        let raw = self
            .fixture
            .graphs
            .get(&package_version_id)
            .ok_or(MergeError::FocalGraphMissing(package_version_id))?;
        let mut graph = PartialGraph::new();
        for &n in &raw.internal_nodes {
            graph.add_internal(n);
        }
        for &n in &raw.external_nodes {
            graph.add_external(n);
        }
        for &[source, target] in &raw.successors {
            graph.add_edge(source, target);
        }
        Ok(graph)
    }
}

/// On-disk shape of the `EdgeMetadataStore` fixture: a flat list, not a
/// map, since `(source, target)` keys don't survive JSON object encoding
/// cleanly.
#[derive(Deserialize)]
struct EdgeStoreFixture {
    edges: Vec<EdgeSitesFixture>,
}

#[derive(Deserialize)]
struct EdgeSitesFixture {
    source: CallableId,
    target: CallableId,
    sites: Vec<InvocationSite>,
}

struct JsonEdgeMetadataStore {
    fixture: EdgeStoreFixture,
}

impl EdgeMetadataStore for JsonEdgeMetadataStore {
    fn edges(&self, predicate: &[(CallableId, CallableId)]) -> Result<Vec<EdgeSites>> {
        let wanted: std::collections::HashSet<_> = predicate.iter().copied().collect();
        Ok(self
            .fixture
            .edges
            .iter()
            .filter(|e| wanted.contains(&(e.source, e.target)))
            .map(|e| EdgeSites {
                source: e.source,
                target: e.target,
                sites: e.sites.clone(),
            })
            .collect())
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> std::result::Result<T, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("parsing {}: {e}", path.display()))
}

fn run(cli: Cli) -> std::result::Result<(), String> {
    tracing_subscriber::fmt::init();

    let dependency_store = JsonDependencyStore {
        fixture: load_json(&cli.dependency_store)?,
    };
    let graph_store = JsonGraphStore {
        fixture: load_json(&cli.graph_store)?,
    };
    let edge_store = JsonEdgeMetadataStore {
        fixture: load_json(&cli.edge_store)?,
    };

    let config = MergeConfig::from_overrides(
        cli.dynamic_site_policy.as_deref(),
        cli.missing_dep_policy.as_deref(),
        None,
    )
    .map_err(|e| e.to_string())?;

    let (graph, report) = merge(
        config,
        &NeverCancel,
        &dependency_store,
        &graph_store,
        &edge_store,
        &cli.focal,
        &cli.dependencies,
    )
    .map_err(|e| e.to_string())?;

    let wire = graph.to_wire();
    let output = serde_json::to_string_pretty(&wire).map_err(|e| e.to_string())?;
    match cli.output {
        Some(path) => fs::write(&path, output).map_err(|e| format!("writing {}: {e}", path.display()))?,
        None => println!("{output}"),
    }

    tracing::info!(
        nodes = wire.nodes.len(),
        arcs = wire.arcs.len(),
        dependencies_dropped = report.dependencies_dropped,
        callables_dropped = report.callables_dropped,
        dynamic_sites_unresolved = report.dynamic_sites_unresolved,
        sites_resolved_zero = report.sites_resolved_zero,
        "merge report"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fasten-merger-cli: {err}");
            ExitCode::FAILURE
        }
    }
}
