//! The core resolution algorithm: turns harvested arcs plus their
//! invocation sites into concrete, resolved call-graph arcs using the
//! universal CHA and type dictionary. Pure function of its inputs — no
//! store access, no I/O — so it's cheap to exercise exhaustively in
//! tests.

use ahash::AHashSet;
use tracing::warn;

use crate::config::DynamicSitePolicy;
use crate::domain::models::{to_clinit_signature, InvocationKind, InvocationSite};
use crate::errors::{MergeError, Result};
use crate::features::call_graph::TypedCallGraph;
use crate::features::cha::UniversalCha;
use crate::features::edge_harvester::HarvestedArc;
use crate::features::type_dictionary::TypeDictionary;

use super::domain::{ResolutionOutcome, ResolvedArc, UnresolvedSite};

/// Resolve every harvested arc's sites into concrete callees.
///
/// Dispatch per [`InvocationKind`]:
/// - `Virtual`/`Interface`: every descendant of the site's receiver type
///   that declares the target's signature.
/// - `Special`: treated as constructor/super dispatch — every ancestor of
///   the site's receiver type that declares the target's signature, plus
///   a `<clinit>` edge to every ancestor's static initializer (a `super`
///   call or super-constructor delegation binds up the hierarchy, not to
///   one exact declaring type).
/// - `Static`: a direct lookup on the receiver type.
/// - `Dynamic`: handled per `dynamic_site_policy`, since the receiver
///   can't be determined statically.
///
/// An arc whose source is external and target is internal is a callback
/// — the partial graph recorded the external interface method as the
/// "caller" of the internal override it will eventually dispatch to, so
/// the resolved arc direction is inverted: each concrete callee becomes
/// the caller of the original external node.
pub fn resolve(
    typed: &TypedCallGraph,
    cha: &UniversalCha,
    type_dict: &TypeDictionary,
    arcs: &[HarvestedArc],
    dynamic_site_policy: DynamicSitePolicy,
) -> Result<ResolutionOutcome> {
    let mut outcome = ResolutionOutcome::default();
    let mut seen: AHashSet<ResolvedArc> = AHashSet::default();

    for arc in arcs {
        // The node whose signature drives dispatch is the external
        // endpoint — normally the target, but for a callback arc
        // (external source, internal target) it's the source, since
        // that's the unresolved symbolic reference.
        let target_is_external = typed.graph.is_external(arc.target);
        let node_id = if target_is_external { arc.target } else { arc.source };
        let Some(node) = typed.typed_nodes.get(&node_id) else {
            warn!(source = arc.source, target = arc.target, "skipping arc with untyped node");
            continue;
        };

        let is_callback = !target_is_external && typed.graph.is_external(arc.source);

        let mut emit = |callee, outcome: &mut ResolutionOutcome| {
            let resolved = if is_callback {
                ResolvedArc { source: callee, target: arc.source }
            } else {
                ResolvedArc { source: arc.source, target: callee }
            };
            if seen.insert(resolved) {
                outcome.arcs.push(resolved);
            }
        };

        // Step 2: a constructor call implicitly chains to every
        // ancestor's constructor of the same signature and every
        // ancestor's static initializer, independent of the explicit
        // sites below.
        if node.is_constructor() {
            for callee in ancestor_chain_callees(cha, type_dict, &node.type_uri, &node.signature) {
                emit(callee, &mut outcome);
            }
        }

        // Step 3: dispatch each explicit invocation site per its kind.
        for site in &arc.sites {
            let callees = resolve_site(cha, type_dict, site, &node.signature, dynamic_site_policy)?;

            let Some(callees) = callees else {
                outcome.dynamic_sites_unresolved += 1;
                continue;
            };

            if callees.is_empty() {
                outcome.sites_resolved_zero += 1;
                outcome.unresolved_sites.push(UnresolvedSite {
                    source: arc.source,
                    target: arc.target,
                    receiver_type: site.receiver_type.to_string(),
                    reason: "no_matching_implementation",
                });
                continue;
            }

            for callee in callees {
                emit(callee, &mut outcome);
            }
        }
    }

    outcome.arcs.sort_unstable();
    Ok(outcome)
}

/// Walk every ancestor of `type_uri` (reflexive — includes `type_uri`
/// itself), collecting each ancestor's declaration of `signature` plus
/// each ancestor's static initializer. Used both for the implicit
/// constructor chain a constructor call triggers and for `special`
/// dispatch, which resolves the same way: `invokespecial` (a `super`
/// call, or a constructor delegating to its own super-constructor)
/// binds up the hierarchy rather than to one exact type.
fn ancestor_chain_callees(
    cha: &UniversalCha,
    type_dict: &TypeDictionary,
    type_uri: &str,
    signature: &str,
) -> Vec<crate::domain::models::CallableId> {
    let clinit_signature = to_clinit_signature(signature);
    let mut callees = Vec::new();
    for ancestor in cha.ancestors_of(type_uri) {
        callees.extend(type_dict.lookup_iter(ancestor, signature));
        callees.extend(type_dict.lookup_iter(ancestor, &clinit_signature));
    }
    callees
}

/// Resolve a single invocation site. Returns `Ok(None)` for a dynamic
/// site under `DynamicSitePolicy::Warn`/`Drop` (counted separately by
/// the caller, never treated as "resolved to zero callees").
///
/// `special` dispatch (a `super.method()` call, or a constructor
/// delegating to a super-constructor) resolves like the implicit
/// constructor chain: walk every ancestor of the site's receiver type,
/// collecting each ancestor's declaration of the signature plus each
/// ancestor's static initializer, rather than binding to one exact
/// declaring type.
fn resolve_site(
    cha: &UniversalCha,
    type_dict: &TypeDictionary,
    site: &InvocationSite,
    target_signature: &str,
    dynamic_site_policy: DynamicSitePolicy,
) -> Result<Option<Vec<crate::domain::models::CallableId>>> {
    match site.kind {
        InvocationKind::Virtual | InvocationKind::Interface => {
            let mut callees = Vec::new();
            for descendant in cha.descendants_of(&site.receiver_type) {
                callees.extend(type_dict.lookup_iter(descendant, target_signature));
            }
            Ok(Some(callees))
        }
        InvocationKind::Special => Ok(Some(ancestor_chain_callees(
            cha,
            type_dict,
            &site.receiver_type,
            target_signature,
        ))),
        InvocationKind::Static => Ok(Some(
            type_dict.lookup_iter(&site.receiver_type, target_signature).collect(),
        )),
        InvocationKind::Dynamic => match dynamic_site_policy {
            DynamicSitePolicy::Warn => {
                warn!(receiver_type = %site.receiver_type, "skipping unresolvable dynamic call site");
                Ok(None)
            }
            DynamicSitePolicy::Drop => Ok(None),
            DynamicSitePolicy::Fail => Err(MergeError::DynamicSiteRejected(format!(
                "dynamic call site at line {} with receiver {}",
                site.source_line, site.receiver_type
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{intern, InvocationKind, Node, PartialGraph};
    use crate::domain::ports::HierarchyRow;
    use crate::features::cha::build_universal_cha;
    use crate::features::type_dictionary::TypeDictionary;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn row(ns: &str, classes: &[&str]) -> HierarchyRow {
        HierarchyRow {
            type_namespace: ns.to_string(),
            super_classes: classes.iter().map(|s| s.to_string()).collect(),
            super_interfaces: vec![],
        }
    }

    fn typed_graph(source: u64, target: u64, target_node: Node) -> TypedCallGraph {
        let mut graph = PartialGraph::new();
        graph.add_internal(source);
        graph.add_external(target);
        graph.add_edge(source, target);
        let mut typed_nodes = HashMap::new();
        typed_nodes.insert(target, target_node);
        TypedCallGraph { graph, typed_nodes }
    }

    #[test]
    fn virtual_dispatch_expands_over_subclasses() {
        let cha = build_universal_cha(&[row("/p/A", &[]), row("/p/B", &["/p/A"])]);
        let mut dict = TypeDictionary::new();
        dict.insert(intern("/p/B"), intern("foo()V"), 42);

        let typed = typed_graph(1, 99, Node::new("/p/A", "foo()V"));
        let site = InvocationSite::new(1, InvocationKind::Virtual, "/p/A");
        let arc = HarvestedArc { source: 1, target: 99, sites: vec![site] };

        let outcome = resolve(&typed, &cha, &dict, &[arc], DynamicSitePolicy::Warn).unwrap();
        assert_eq!(outcome.arcs, vec![ResolvedArc { source: 1, target: 42 }]);
    }

    #[test]
    fn constructor_chain_adds_clinit_edges() {
        let cha = build_universal_cha(&[row("/p/A", &[]), row("/p/B", &["/p/A"])]);
        let mut dict = TypeDictionary::new();
        dict.insert(intern("/p/B"), intern("<init>()V"), 1);
        dict.insert(intern("/p/A"), intern("<clinit>()V"), 2);

        let typed = typed_graph(1, 99, Node::new("/p/B", "<init>()V"));
        let site = InvocationSite::new(1, InvocationKind::Special, "/p/B");
        let arc = HarvestedArc { source: 1, target: 99, sites: vec![site] };

        let outcome = resolve(&typed, &cha, &dict, &[arc], DynamicSitePolicy::Warn).unwrap();
        assert!(outcome.arcs.contains(&ResolvedArc { source: 1, target: 1 }));
        assert!(outcome.arcs.contains(&ResolvedArc { source: 1, target: 2 }));
    }

    #[test]
    fn special_site_walks_ancestors_for_a_super_call() {
        // `site.receiver_type` is `/p/B`, but `bar()V` is declared only on
        // its ancestor `/p/A` — a `super.bar()` call. A `special` site
        // must resolve via the ancestor chain, not an exact lookup on the
        // receiver type, since the receiver itself has no such entry.
        let cha = build_universal_cha(&[row("/p/A", &[]), row("/p/B", &["/p/A"])]);
        let mut dict = TypeDictionary::new();
        dict.insert(intern("/p/A"), intern("bar()V"), 42);

        let typed = typed_graph(1, 99, Node::new("/p/B", "bar()V"));
        let site = InvocationSite::new(1, InvocationKind::Special, "/p/B");
        let arc = HarvestedArc { source: 1, target: 99, sites: vec![site] };

        let outcome = resolve(&typed, &cha, &dict, &[arc], DynamicSitePolicy::Warn).unwrap();
        assert_eq!(outcome.arcs, vec![ResolvedArc { source: 1, target: 42 }]);
    }

    #[test]
    fn dynamic_site_under_fail_policy_errors() {
        let cha = UniversalCha::default();
        let dict = TypeDictionary::new();
        let typed = typed_graph(1, 99, Node::new("/p/A", "foo()V"));
        let site = InvocationSite::new(1, InvocationKind::Dynamic, "/p/A");
        let arc = HarvestedArc { source: 1, target: 99, sites: vec![site] };

        let err = resolve(&typed, &cha, &dict, &[arc], DynamicSitePolicy::Fail).unwrap_err();
        assert_eq!(err.category(), "dynamic_site_rejected");
    }

    #[test]
    fn callback_arc_direction_is_inverted() {
        let cha = UniversalCha::default();
        let mut dict = TypeDictionary::new();
        dict.insert(intern("/p/A"), intern("foo()V"), 7);

        let mut graph = PartialGraph::new();
        graph.add_external(1);
        graph.add_internal(99);
        graph.add_edge(1, 99);
        let mut typed_nodes = HashMap::new();
        // Source (external) carries the signature that drives dispatch;
        // target's own type is deliberately different to prove the
        // resolver reads the node from `source`, not `target`, here.
        typed_nodes.insert(1, Node::new("/p/A", "foo()V"));
        typed_nodes.insert(99, Node::new("/p/Other", "unrelated()V"));
        let typed = TypedCallGraph { graph, typed_nodes };

        let site = InvocationSite::new(1, InvocationKind::Static, "/p/A");
        let arc = HarvestedArc { source: 1, target: 99, sites: vec![site] };

        let outcome = resolve(&typed, &cha, &dict, &[arc], DynamicSitePolicy::Warn).unwrap();
        assert_eq!(outcome.arcs, vec![ResolvedArc { source: 7, target: 1 }]);
    }
}
