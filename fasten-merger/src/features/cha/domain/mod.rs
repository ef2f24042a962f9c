//! The universal class hierarchy: every ancestor/descendant relation
//! reachable across the whole dependency closure, reflexive and
//! transitively closed.

use std::collections::HashMap;

use ahash::AHashSet;

use crate::domain::models::TypeUri;

/// Ancestor/descendant lookup table built once per merge and shared
/// read-only by the resolver.
///
/// Both maps are reflexive (`ancestors_of(t)` always contains `t` itself)
/// and transitively closed, so a single lookup answers "is `t` a subtype
/// of `u`" without walking the hierarchy graph at resolution time.
#[derive(Debug, Default)]
pub struct UniversalCha {
    ancestors: HashMap<TypeUri, Vec<TypeUri>>,
    descendants: HashMap<TypeUri, Vec<TypeUri>>,
}

impl UniversalCha {
    pub(crate) fn from_maps(
        ancestors: HashMap<TypeUri, AHashSet<TypeUri>>,
        descendants: HashMap<TypeUri, AHashSet<TypeUri>>,
    ) -> Self {
        let to_sorted_vec = |m: HashMap<TypeUri, AHashSet<TypeUri>>| {
            m.into_iter()
                .map(|(k, v)| {
                    let mut v: Vec<TypeUri> = v.into_iter().collect();
                    v.sort_unstable();
                    (k, v)
                })
                .collect()
        };
        Self {
            ancestors: to_sorted_vec(ancestors),
            descendants: to_sorted_vec(descendants),
        }
    }

    /// Every type `t` is an ancestor of, including `t` itself. Empty
    /// (not missing) for a type with no recorded hierarchy facts other
    /// than itself.
    pub fn ancestors_of(&self, type_uri: &str) -> &[TypeUri] {
        self.ancestors
            .get(type_uri)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every type that is `t` or a (transitive) subtype of `t`.
    pub fn descendants_of(&self, type_uri: &str) -> &[TypeUri] {
        self.descendants
            .get(type_uri)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// `t` is a subtype of (or equal to) `u`.
    pub fn is_subtype_of(&self, t: &str, u: &str) -> bool {
        self.ancestors_of(t).iter().any(|a| &**a == u)
    }

    pub fn type_count(&self) -> usize {
        self.ancestors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::intern;

    fn cha_fixture() -> UniversalCha {
        // B extends A, C extends B — ancestors(C) = {C, B, A}
        let mut ancestors = HashMap::new();
        let mut descendants = HashMap::new();
        ancestors.insert(intern("/p/A"), AHashSet::from_iter([intern("/p/A")]));
        ancestors.insert(
            intern("/p/B"),
            AHashSet::from_iter([intern("/p/B"), intern("/p/A")]),
        );
        ancestors.insert(
            intern("/p/C"),
            AHashSet::from_iter([intern("/p/C"), intern("/p/B"), intern("/p/A")]),
        );
        descendants.insert(
            intern("/p/A"),
            AHashSet::from_iter([intern("/p/A"), intern("/p/B"), intern("/p/C")]),
        );
        descendants.insert(
            intern("/p/B"),
            AHashSet::from_iter([intern("/p/B"), intern("/p/C")]),
        );
        descendants.insert(intern("/p/C"), AHashSet::from_iter([intern("/p/C")]));
        UniversalCha::from_maps(ancestors, descendants)
    }

    #[test]
    fn ancestors_are_reflexive_and_transitive() {
        let cha = cha_fixture();
        let a = cha.ancestors_of("/p/C");
        assert!(a.iter().any(|t| &**t == "/p/C"));
        assert!(a.iter().any(|t| &**t == "/p/B"));
        assert!(a.iter().any(|t| &**t == "/p/A"));
    }

    #[test]
    fn descendants_are_the_dual_of_ancestors() {
        let cha = cha_fixture();
        assert!(cha.is_subtype_of("/p/C", "/p/A"));
        assert!(cha.descendants_of("/p/A").iter().any(|t| &**t == "/p/C"));
    }

    #[test]
    fn unknown_type_has_empty_relations() {
        let cha = cha_fixture();
        assert!(cha.ancestors_of("/p/Unknown").is_empty());
    }
}
