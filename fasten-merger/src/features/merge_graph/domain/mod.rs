//! The merged output graph: an idempotent builder plus an immutable
//! snapshot with O(1) successor lookup and a stable, sorted wire form.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::models::CallableId;

/// Accumulates nodes and arcs across every resolved edge in a merge.
/// `add_node`/`add_arc` are idempotent — calling either twice with the
/// same argument has no additional effect, so callers never need to
/// deduplicate before inserting.
#[derive(Debug, Default)]
pub struct MergedGraphBuilder {
    nodes: BTreeSet<CallableId>,
    arcs: BTreeSet<(CallableId, CallableId)>,
}

impl MergedGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: CallableId) {
        self.nodes.insert(node);
    }

    pub fn add_arc(&mut self, source: CallableId, target: CallableId) {
        self.nodes.insert(source);
        self.nodes.insert(target);
        self.arcs.insert((source, target));
    }

    /// Freeze into an immutable snapshot with precomputed successor and
    /// predecessor indices.
    pub fn build(self) -> MergedGraph {
        let mut successors: BTreeMap<CallableId, BTreeSet<CallableId>> = BTreeMap::new();
        let mut predecessors: BTreeMap<CallableId, BTreeSet<CallableId>> = BTreeMap::new();
        for &(source, target) in &self.arcs {
            successors.entry(source).or_default().insert(target);
            predecessors.entry(target).or_default().insert(source);
        }
        MergedGraph {
            nodes: self.nodes,
            arcs: self.arcs,
            successors,
            predecessors,
        }
    }
}

/// An immutable, deduplicated merged call graph.
#[derive(Debug, Clone, Default)]
pub struct MergedGraph {
    nodes: BTreeSet<CallableId>,
    arcs: BTreeSet<(CallableId, CallableId)>,
    successors: BTreeMap<CallableId, BTreeSet<CallableId>>,
    predecessors: BTreeMap<CallableId, BTreeSet<CallableId>>,
}

impl MergedGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = CallableId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn arcs(&self) -> impl Iterator<Item = (CallableId, CallableId)> + '_ {
        self.arcs.iter().copied()
    }

    /// O(1) (amortized `BTreeMap` lookup) access to a node's successors.
    pub fn successors_of(&self, node: CallableId) -> impl Iterator<Item = CallableId> + '_ {
        self.successors
            .get(&node)
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    /// O(1) (amortized `BTreeMap` lookup) access to a node's predecessors.
    pub fn predecessors_of(&self, node: CallableId) -> impl Iterator<Item = CallableId> + '_ {
        self.predecessors
            .get(&node)
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    pub fn to_wire(&self) -> WireGraph {
        WireGraph {
            nodes: self.nodes.iter().copied().collect(),
            arcs: self.arcs.iter().map(|&(s, t)| [s, t]).collect(),
        }
    }
}

/// The `{ nodes: [u64], arcs: [[u64,u64]] }` serialization shape.
/// `BTreeSet` iteration is already ascending, so `nodes`/`arcs` are
/// emitted in a stable, lexicographic order with no extra sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGraph {
    pub nodes: Vec<CallableId>,
    pub arcs: Vec<[CallableId; 2]>,
}
