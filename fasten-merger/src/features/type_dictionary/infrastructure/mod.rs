//! Builds a [`TypeDictionary`] by fetching the URI of every callable in
//! the closure and decoding it into a `(TypeUri, Signature)` pair.

use rayon::prelude::*;
use tracing::warn;

use crate::domain::models::{intern, CallableId};
use crate::features::uri_codec;

use super::domain::TypeDictionary;

/// One malformed-URI drop, returned alongside the dictionary so the
/// caller can fold it into `MergeReport::callables_dropped`.
pub struct BuildOutcome {
    pub dictionary: TypeDictionary,
    pub dropped: usize,
}

/// Decode every `(callable, uri)` pair in parallel and fold the results
/// into a dictionary. A callable whose URI fails to parse is logged and
/// dropped — one bad entry never aborts the whole build.
pub fn build_type_dictionary(uris: &[(CallableId, String)]) -> BuildOutcome {
    let parsed: Vec<Option<(CallableId, String, String)>> = uris
        .par_iter()
        .map(|(callable, uri)| match uri_codec::parse(uri) {
            Ok(node) => Some((*callable, node.type_uri.to_string(), node.signature.to_string())),
            Err(err) => {
                warn!(callable, uri, error = %err, "dropping callable with malformed URI");
                None
            }
        })
        .collect();

    let mut dictionary = TypeDictionary::new();
    let mut dropped = 0;
    for entry in parsed {
        match entry {
            Some((callable, type_uri, signature)) => {
                dictionary.insert(intern(type_uri), intern(signature), callable);
            }
            None => dropped += 1,
        }
    }

    BuildOutcome { dictionary, dropped }
}
