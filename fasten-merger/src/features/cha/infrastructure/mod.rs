//! Builds a [`UniversalCha`] from the hierarchy rows a `DependencyStore`
//! reports across the whole dependency closure.

use std::collections::{HashMap, VecDeque};

use ahash::AHashSet;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::warn;

use crate::domain::models::{intern, TypeUri};
use crate::domain::ports::HierarchyRow;

use super::domain::UniversalCha;

/// Build the universal CHA from every hierarchy row visible in the
/// closure. Subtype → supertype edges are collected into a directed
/// graph; `tarjan_scc` flags cyclic (malformed) hierarchy metadata for a
/// single warning instead of looping forever, and ancestor/descendant
/// sets are computed with an iterative worklist so a cycle just makes
/// every member of its strongly connected component a mutual
/// ancestor/descendant rather than causing non-termination.
pub fn build_universal_cha(rows: &[HierarchyRow]) -> UniversalCha {
    let mut graph: DiGraph<TypeUri, ()> = DiGraph::new();
    let mut node_index: HashMap<TypeUri, NodeIndex> = HashMap::new();

    let mut get_or_insert = |graph: &mut DiGraph<TypeUri, ()>,
                              index: &mut HashMap<TypeUri, NodeIndex>,
                              type_uri: &str|
     -> NodeIndex {
        let interned = intern(type_uri);
        *index
            .entry(interned.clone())
            .or_insert_with(|| graph.add_node(interned))
    };

    for row in rows {
        let subtype = get_or_insert(&mut graph, &mut node_index, &row.type_namespace);
        for super_type in row.super_classes.iter().chain(row.super_interfaces.iter()) {
            let supertype = get_or_insert(&mut graph, &mut node_index, super_type);
            graph.update_edge(subtype, supertype, ());
        }
    }

    let sccs = tarjan_scc(&graph);
    let cyclic_components = sccs.iter().filter(|scc| scc.len() > 1).count();
    if cyclic_components > 0 {
        warn!(
            cyclic_components,
            "hierarchy metadata contains cyclic super-type relations; treating each cycle's \
             members as mutual ancestors/descendants"
        );
    }

    let mut ancestors: HashMap<TypeUri, AHashSet<TypeUri>> = HashMap::new();
    let mut descendants: HashMap<TypeUri, AHashSet<TypeUri>> = HashMap::new();

    for &start in node_index.values() {
        let reached = reachable_from(&graph, start);
        let start_uri = graph[start].clone();
        let mut own_ancestors = AHashSet::default();
        for node in reached {
            let ancestor_uri = graph[node].clone();
            own_ancestors.insert(ancestor_uri.clone());
            descendants
                .entry(ancestor_uri)
                .or_default()
                .insert(start_uri.clone());
        }
        ancestors.insert(start_uri, own_ancestors);
    }

    UniversalCha::from_maps(ancestors, descendants)
}

/// Every node reachable from `start` by following subtype → supertype
/// edges, including `start` itself (reflexivity). A plain `VecDeque`
/// worklist with a visited set, not recursion, so a deeply nested or
/// cyclic hierarchy can't blow the stack or loop forever.
fn reachable_from(graph: &DiGraph<TypeUri, ()>, start: NodeIndex) -> Vec<NodeIndex> {
    let mut visited = AHashSet::default();
    let mut worklist = VecDeque::new();
    let mut result = Vec::new();

    visited.insert(start);
    worklist.push_back(start);

    while let Some(node) = worklist.pop_front() {
        result.push(node);
        for neighbor in graph.neighbors(node) {
            if visited.insert(neighbor) {
                worklist.push_back(neighbor);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ns: &str, classes: &[&str], interfaces: &[&str]) -> HierarchyRow {
        HierarchyRow {
            type_namespace: ns.to_string(),
            super_classes: classes.iter().map(|s| s.to_string()).collect(),
            super_interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn builds_linear_chain() {
        let rows = vec![
            row("/p/A", &[], &[]),
            row("/p/B", &["/p/A"], &[]),
            row("/p/C", &["/p/B"], &[]),
        ];
        let cha = build_universal_cha(&rows);
        assert!(cha.is_subtype_of("/p/C", "/p/A"));
        assert!(cha.descendants_of("/p/A").iter().any(|t| &**t == "/p/C"));
    }

    #[test]
    fn interfaces_count_as_ancestors() {
        let rows = vec![row("/p/A", &[], &[]), row("/p/B", &[], &["/p/A"])];
        let cha = build_universal_cha(&rows);
        assert!(cha.is_subtype_of("/p/B", "/p/A"));
    }

    #[test]
    fn cyclic_hierarchy_terminates_and_is_mutual() {
        // Malformed metadata: A extends B, B extends A.
        let rows = vec![row("/p/A", &["/p/B"], &[]), row("/p/B", &["/p/A"], &[])];
        let cha = build_universal_cha(&rows);
        assert!(cha.is_subtype_of("/p/A", "/p/B"));
        assert!(cha.is_subtype_of("/p/B", "/p/A"));
    }

    #[test]
    fn every_type_is_its_own_ancestor() {
        let rows = vec![row("/p/A", &[], &[])];
        let cha = build_universal_cha(&rows);
        assert!(cha.is_subtype_of("/p/A", "/p/A"));
    }
}
