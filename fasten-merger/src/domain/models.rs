//! Domain Models - Core entities of the cross-artifact call-graph merger
//!
//! Pure Rust types. `TypeUri`/`Signature` are interned (`Arc<str>`)
//! so the universal CHA and type dictionary can share the same allocation
//! for every repeated type/signature string across a large dependency
//! closure.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Interned type/signature string. Two `intern()` calls on equal strings
/// return the same allocation (`Arc::ptr_eq`), which is what lets the CHA
/// store ancestor/descendant sets as small `Arc<str>` vectors instead of
/// owned `String`s.
pub type TypeUri = Arc<str>;

/// See [`TypeUri`]. Kept as a distinct alias for readability at call sites
/// even though the underlying representation is identical.
pub type Signature = Arc<str>;

/// Opaque 64-bit identifier assigned by the dependency store; unique across
/// the closure.
pub type CallableId = u64;

/// Opaque identifier for a dependency (package-version) returned by
/// `DependencyStore::resolve_ids`.
pub type DependencyId = u64;

static INTERNER: Lazy<DashMap<Arc<str>, Arc<str>>> = Lazy::new(DashMap::new);

/// Intern a string, deduplicating against every other interned string in
/// the process. Concurrent-safe: callers may intern from the parallel CHA
/// and type-dictionary builders without external synchronization.
pub fn intern(s: impl AsRef<str>) -> Arc<str> {
    let s = s.as_ref();
    if let Some(existing) = INTERNER.get(s) {
        return Arc::clone(existing.value());
    }
    let arc: Arc<str> = Arc::from(s);
    INTERNER.entry(Arc::clone(&arc)).or_insert(arc).clone()
}

/// Method-name marker for instance constructors.
pub const CONSTRUCTOR_METHOD: &str = "<init>";
/// Method-name marker for class/static initializers.
pub const STATIC_INITIALIZER_METHOD: &str = "<clinit>";

/// Rewrite a constructor signature into the signature of the static
/// initializer of the same type, by replacing the literal `<init>` method
/// name with `<clinit>`, used when propagating a constructor call up an
/// ancestor chain during constructor-chain resolution.
///
/// Only the method-name component is substituted; a signature that does not
/// start with `<init>` is returned unchanged (callers only invoke this on
/// signatures already known to be constructors via [`Node::is_constructor`]).
pub fn to_clinit_signature(signature: &str) -> String {
    signature.replacen(CONSTRUCTOR_METHOD, STATIC_INITIALIZER_METHOD, 1)
}

/// A method identifier resolved to its type and signature.
///
/// Derived from a callable's canonical URI by splitting at the first `.` of
/// the entity component — see [`crate::features::uri_codec`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub type_uri: TypeUri,
    pub signature: Signature,
}

impl Node {
    pub fn new(type_uri: impl Into<TypeUri>, signature: impl Into<Signature>) -> Self {
        Self {
            type_uri: type_uri.into(),
            signature: signature.into(),
        }
    }

    /// True when the signature starts with `<init>`.
    pub fn is_constructor(&self) -> bool {
        self.signature.starts_with(CONSTRUCTOR_METHOD)
    }
}

/// Invocation-site kind.
///
/// `virtual = 0, interface = 1, special = 2, static = 3, dynamic = 4`.
/// Unknown wire values decode as `Static` with a logged warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationKind {
    Virtual,
    Interface,
    Special,
    Static,
    Dynamic,
}

impl InvocationKind {
    /// Decode the wire `enum8`. Unknown values fall back to
    /// `Static`, matching "Unknown kinds map to `static` with a logged
    /// warning" — the warning itself is the caller's responsibility since
    /// only the caller has a `tracing` span with the site's coordinates.
    pub fn from_wire(value: u8) -> (Self, bool) {
        match value {
            0 => (InvocationKind::Virtual, false),
            1 => (InvocationKind::Interface, false),
            2 => (InvocationKind::Special, false),
            3 => (InvocationKind::Static, false),
            4 => (InvocationKind::Dynamic, false),
            _ => (InvocationKind::Static, true),
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            InvocationKind::Virtual => 0,
            InvocationKind::Interface => 1,
            InvocationKind::Special => 2,
            InvocationKind::Static => 3,
            InvocationKind::Dynamic => 4,
        }
    }
}

/// One call site within a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationSite {
    pub source_line: i32,
    pub kind: InvocationKind,
    pub receiver_type: TypeUri,
}

impl InvocationSite {
    pub fn new(source_line: i32, kind: InvocationKind, receiver_type: impl Into<TypeUri>) -> Self {
        Self {
            source_line,
            kind,
            receiver_type: receiver_type.into(),
        }
    }
}

/// A partial, per-artifact call graph.
///
/// Invariant: `internal_nodes ∩ external_nodes = ∅`; every edge endpoint
/// appears in one of the two sets. Callers that build a `PartialGraph` by
/// hand (e.g. tests) are responsible for upholding this; the merger never
/// mutates a `PartialGraph` once fetched.
#[derive(Debug, Clone, Default)]
pub struct PartialGraph {
    pub internal_nodes: HashSet<CallableId>,
    pub external_nodes: HashSet<CallableId>,
    pub successors: HashMap<CallableId, HashSet<CallableId>>,
}

impl PartialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `node` belongs to the external-node set.
    pub fn is_external(&self, node: CallableId) -> bool {
        self.external_nodes.contains(&node)
    }

    pub fn add_internal(&mut self, node: CallableId) {
        self.internal_nodes.insert(node);
    }

    pub fn add_external(&mut self, node: CallableId) {
        self.external_nodes.insert(node);
    }

    pub fn add_edge(&mut self, source: CallableId, target: CallableId) {
        self.successors.entry(source).or_default().insert(target);
    }

    /// Every node referenced by an edge, on either side.
    pub fn edge_endpoints(&self) -> impl Iterator<Item = (CallableId, CallableId)> + '_ {
        self.successors.iter().flat_map(|(&src, targets)| {
            targets.iter().map(move |&dst| (src, dst))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates() {
        let a = intern("/java.lang/Object");
        let b = intern("/java.lang/Object");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn constructor_detection() {
        let ctor = Node::new("/a/B", "<init>()V");
        let method = Node::new("/a/B", "foo()V");
        assert!(ctor.is_constructor());
        assert!(!method.is_constructor());
    }

    #[test]
    fn clinit_rewrite_only_touches_method_name() {
        assert_eq!(
            to_clinit_signature("<init>(Ljava.lang.String%2Fjava.lang;)V"),
            "<clinit>(Ljava.lang.String%2Fjava.lang;)V"
        );
    }

    #[test]
    fn unknown_wire_kind_falls_back_to_static_with_flag() {
        let (kind, was_unknown) = InvocationKind::from_wire(200);
        assert_eq!(kind, InvocationKind::Static);
        assert!(was_unknown);
    }

    #[test]
    fn partial_graph_external_predicate() {
        let mut g = PartialGraph::new();
        g.add_internal(1);
        g.add_external(2);
        assert!(!g.is_external(1));
        assert!(g.is_external(2));
    }
}
