//! Maps `(TypeUri, Signature)` to the callables that implement it, the
//! lookup table the resolver consults once it knows a receiver type and a
//! call-site signature.

use std::collections::HashMap;

use ahash::AHashSet;

use crate::domain::models::{CallableId, Signature, TypeUri};

#[derive(Debug, Default)]
pub struct TypeDictionary {
    entries: HashMap<(TypeUri, Signature), AHashSet<CallableId>>,
}

impl TypeDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_uri: TypeUri, signature: Signature, callable: CallableId) {
        self.entries
            .entry((type_uri, signature))
            .or_default()
            .insert(callable);
    }

    /// Every callable declared by `type_uri` with exactly `signature`.
    /// Empty when the type exists but doesn't declare that signature
    /// (normal — the caller should keep walking the ancestor chain).
    pub fn lookup_iter<'a>(
        &'a self,
        type_uri: &str,
        signature: &str,
    ) -> impl Iterator<Item = CallableId> + 'a {
        self.entries
            .get(&(crate::domain::models::intern(type_uri), crate::domain::models::intern(signature)))
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
