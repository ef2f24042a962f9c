//! Property tests for the universal CHA's ancestor/descendant relation
//! and the merged-graph builder's idempotence, generated rather than
//! hand-picked so they cover shapes (cycles, diamonds, disconnected
//! components) the example-based unit tests don't happen to hit.

use std::collections::HashSet;

use proptest::prelude::*;

use fasten_merger::domain::ports::HierarchyRow;
use fasten_merger::features::cha::build_universal_cha;
use fasten_merger::features::merge_graph::MergedGraphBuilder;

fn type_name(i: usize) -> String {
    format!("/prop/T{i}")
}

/// A random small super-type graph: `type_count` types, each with zero
/// or more super-class edges to other types in the same pool (self-edges
/// and cycles allowed — the builder must tolerate both).
fn hierarchy_rows() -> impl Strategy<Value = Vec<HierarchyRow>> {
    (2usize..8).prop_flat_map(|type_count| {
        let edges = prop::collection::vec(
            (0..type_count, 0..type_count),
            0..(type_count * 2),
        );
        edges.prop_map(move |edges| {
            let mut super_of: Vec<Vec<usize>> = vec![Vec::new(); type_count];
            for (child, parent) in edges {
                if child != parent {
                    super_of[child].push(parent);
                }
            }
            (0..type_count)
                .map(|i| HierarchyRow {
                    type_namespace: type_name(i),
                    super_classes: super_of[i].iter().map(|&p| type_name(p)).collect(),
                    super_interfaces: Vec::new(),
                })
                .collect::<Vec<_>>()
        })
    })
}

proptest! {
    /// Every type is its own ancestor and its own descendant, for any
    /// hierarchy shape including cycles.
    #[test]
    fn ancestors_and_descendants_are_reflexive(rows in hierarchy_rows()) {
        let type_count = rows.len();
        let cha = build_universal_cha(&rows);
        for i in 0..type_count {
            let t = type_name(i);
            prop_assert!(cha.ancestors_of(&t).iter().any(|a| **a == t));
            prop_assert!(cha.descendants_of(&t).iter().any(|d| **d == t));
        }
    }

    /// `u` is an ancestor of `t` exactly when `t` is a descendant of `u`,
    /// for every pair of types known to the closure.
    #[test]
    fn ancestors_and_descendants_are_dual(rows in hierarchy_rows()) {
        let type_count = rows.len();
        let cha = build_universal_cha(&rows);
        let names: Vec<String> = (0..type_count).map(type_name).collect();

        for t in &names {
            let ancestors: HashSet<&str> = cha.ancestors_of(t).iter().map(|a| a.as_ref()).collect();
            for u in &names {
                let u_has_t_as_descendant = cha.descendants_of(u).iter().any(|d| d.as_ref() == t.as_str());
                prop_assert_eq!(
                    ancestors.contains(u.as_str()),
                    u_has_t_as_descendant,
                    "ancestors({t}) contains {u} iff descendants({u}) contains {t}"
                );
            }
        }
    }

    /// Adding the same node twice, or the same arc twice, never changes
    /// the resulting counts — regardless of insertion order.
    #[test]
    fn merged_graph_builder_is_idempotent(
        mut arcs in prop::collection::vec((0u64..50, 0u64..50), 0..40)
    ) {
        let mut once = MergedGraphBuilder::new();
        for &(s, t) in &arcs {
            once.add_arc(s, t);
        }
        let once = once.build();

        // Replay every arc a second time, interleaved, and confirm the
        // resulting graph is identical.
        let mut twice_input = arcs.clone();
        twice_input.extend(arcs.drain(..));
        let mut twice = MergedGraphBuilder::new();
        for &(s, t) in &twice_input {
            twice.add_arc(s, t);
        }
        let twice = twice.build();

        prop_assert_eq!(once.node_count(), twice.node_count());
        prop_assert_eq!(once.arc_count(), twice.arc_count());
        prop_assert_eq!(once.to_wire(), twice.to_wire());
    }
}
