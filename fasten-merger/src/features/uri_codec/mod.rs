//! URI Codec
//!
//! Parses and canonicalizes method identifiers of the form
//! `/<namespace>/<ClassName>.<signature>`, where each argument and the
//! return type inside `<signature>` is itself a recursively
//! percent-encoded type URI.
//!
//! ## Authority grammar
//!
//! A *qualified* URI additionally carries a forge authority ahead of the
//! path, shaped `fasten://<forge>!<product>$<version>/<namespace>/...`
//! (a *revision* is forge + product + version, which is exactly what
//! this authority encodes). A URI with no `$` is
//! already in *decanonicalized* (short) form — the whole string is the
//! path. The `$` is used as the anchor for locating the authority/path
//! boundary because it is the one character the grammar guarantees won't
//! appear unescaped inside the path itself.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::domain::models::Node;
use crate::errors::MalformedUri;

const PATH_ENCODE_SET: &AsciiSet = &CONTROLS.add(b'/').add(b'.').add(b'(').add(b')').add(b',').add(b'%');

/// Split a URI into `(authority, path)`. `authority` is `""` for an
/// already-decanonicalized URI.
fn split_authority(uri: &str) -> (&str, &str) {
    if let Some(dollar_idx) = uri.find('$') {
        if let Some(rel_slash) = uri[dollar_idx..].find('/') {
            let split_at = dollar_idx + rel_slash;
            return (&uri[..split_at], &uri[split_at..]);
        }
    }
    ("", uri)
}

/// Percent-decode `s`, mapping a malformed escape to [`MalformedUri::InvalidPercentEscape`].
fn percent_decode(s: &str, whole_uri: &str) -> Result<String, MalformedUri> {
    // `percent_decode_str` silently passes through `%` not followed by two
    // hex digits as literal bytes; we reject that instead.
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '%' {
            let hex: String = s[i + 1..].chars().take(2).collect();
            if hex.len() != 2 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                return Err(MalformedUri::InvalidPercentEscape(whole_uri.to_string()));
            }
        }
    }
    percent_decode_str(s)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|_| MalformedUri::InvalidPercentEscape(whole_uri.to_string()))
}

/// Validate that `signature`'s parentheses balance, ignoring characters
/// that are part of a percent-escape triplet (a percent-encoded argument
/// can never contribute a raw `(`/`)` — encoding guarantees that).
fn check_balanced_parens(signature: &str) -> Result<(), MalformedUri> {
    let mut depth: i32 = 0;
    let bytes = signature.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => i += 3,
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(MalformedUri::UnbalancedParentheses(signature.to_string()));
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    if depth != 0 {
        return Err(MalformedUri::UnbalancedParentheses(signature.to_string()));
    }
    Ok(())
}

/// Parse a canonical or decanonicalized method URI into a [`Node`].
/// Isolates the entity component, splits it at the first literal
/// `.`, percent-decodes the left (type) side, and validates the right
/// (signature) side's parentheses.
pub fn parse(uri: &str) -> Result<Node, MalformedUri> {
    let (_authority, path) = split_authority(uri);

    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| MalformedUri::MissingNamespace(uri.to_string()))?;
    let namespace_end = rest
        .find('/')
        .ok_or_else(|| MalformedUri::MissingNamespace(uri.to_string()))?;
    let namespace = &rest[..namespace_end];
    if namespace.is_empty() {
        return Err(MalformedUri::MissingNamespace(uri.to_string()));
    }
    let entity = &rest[namespace_end + 1..];

    let dot_idx = entity.find('.').unwrap_or(entity.len());
    let class_name = &entity[..dot_idx];
    let signature = if dot_idx < entity.len() {
        &entity[dot_idx + 1..]
    } else {
        ""
    };

    check_balanced_parens(signature)?;

    let type_uri = percent_decode(&format!("/{namespace}/{class_name}"), uri)?;
    let signature = percent_decode(signature, uri)?;

    Ok(Node::new(type_uri, signature))
}

/// Build a decanonicalized (short-form) method URI from a [`Node`] —
/// the inverse of [`parse`] for well-formed inputs.
pub fn build(type_uri: &str, signature: &str) -> String {
    format!("{type_uri}.{signature}")
}

/// Split a raw signature `methodName(arg1,arg2,...)returnType` into its
/// three raw (still percent-encoded) components. Top-level commas and
/// parentheses are unambiguous because a percent-encoded argument can
/// never contain a literal `(`, `)`, or `,`.
fn split_signature_components(signature: &str) -> Option<(&str, Vec<&str>, &str)> {
    let open = signature.find('(')?;
    let close = signature.find(')')?;
    if close < open {
        return None;
    }
    let method_name = &signature[..open];
    let args_raw = &signature[open + 1..close];
    let return_type = &signature[close + 1..];
    let args = if args_raw.is_empty() {
        Vec::new()
    } else {
        args_raw.split(',').collect()
    };
    Some((method_name, args, return_type))
}

/// Strip `authority` from the front of a percent-encoded sub-URI if
/// present, re-encoding the result.
fn strip_authority_from_component(component: &str, authority: &str) -> Result<String, MalformedUri> {
    if component.is_empty() || authority.is_empty() {
        return Ok(component.to_string());
    }
    let decoded = percent_decode(component, component)?;
    let stripped = decoded.strip_prefix(authority).unwrap_or(&decoded);
    Ok(utf8_percent_encode(stripped, PATH_ENCODE_SET).to_string())
}

/// Prepend `authority` to a percent-encoded sub-URI if it doesn't already
/// carry one, re-encoding the result (inverse of
/// [`strip_authority_from_component`]).
fn add_authority_to_component(component: &str, authority: &str) -> Result<String, MalformedUri> {
    if component.is_empty() || authority.is_empty() {
        return Ok(component.to_string());
    }
    let decoded = percent_decode(component, component)?;
    if decoded.contains('$') {
        // Already carries a (possibly different) authority; leave as-is.
        return Ok(component.to_string());
    }
    let qualified = format!("{authority}{decoded}");
    Ok(utf8_percent_encode(&qualified, PATH_ENCODE_SET).to_string())
}

/// Strip the outer authority from every argument/return-type sub-URI of
/// `uri` that carries that same authority, recovering the short form
/// A `uri` with no authority (already short-form) is
/// returned unchanged.
pub fn decanonicalize(uri: &str) -> Result<String, MalformedUri> {
    let (authority, path) = split_authority(uri);
    if authority.is_empty() {
        return Ok(uri.to_string());
    }

    let node = parse(uri)?;
    let Some((method_name, args, return_type)) = split_signature_components(&node.signature) else {
        return Ok(uri.to_string());
    };

    let stripped_args: Result<Vec<String>, MalformedUri> = args
        .iter()
        .map(|a| strip_authority_from_component(a, authority))
        .collect();
    let stripped_return = strip_authority_from_component(return_type, authority)?;

    let new_signature = format!(
        "{method_name}({}){stripped_return}",
        stripped_args?.join(",")
    );
    let _ = path;
    Ok(format!("{}.{}", node.type_uri, new_signature))
}

/// Inverse of [`decanonicalize`]: prepend `authority` to every
/// argument/return-type sub-URI of the short-form `uri` that doesn't
/// already carry one, producing the canonical form:
/// `decanonicalize(canonicalize(u)) == u` when `u` has no cross-authority
/// sub-URIs.
pub fn canonicalize(uri: &str, authority: &str) -> Result<String, MalformedUri> {
    if authority.is_empty() {
        return Ok(uri.to_string());
    }
    let node = parse(uri)?;
    let Some((method_name, args, return_type)) = split_signature_components(&node.signature) else {
        return Ok(format!("{authority}{uri}"));
    };

    let qualified_args: Result<Vec<String>, MalformedUri> = args
        .iter()
        .map(|a| add_authority_to_component(a, authority))
        .collect();
    let qualified_return = add_authority_to_component(return_type, authority)?;

    let new_signature = format!(
        "{method_name}({}){qualified_return}",
        qualified_args?.join(",")
    );
    Ok(format!("{authority}{}.{new_signature}", node.type_uri))
}
