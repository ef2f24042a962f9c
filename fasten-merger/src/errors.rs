//! Error types for fasten-merger
//!
//! Unified error handling across the crate. Some variants are fatal to the
//! whole merge; per-item failures are never represented here, only
//! surfaced through the `MergeReport` side channel
//! (`crate::application::merge_usecase::MergeReport`).

use thiserror::Error;

/// Top-level error type for a merge invocation.
///
/// Only failures that abort the whole merge are represented here:
/// `CoordinateMalformed`, `FocalGraphMissing`, `StoreUnavailable`, and
/// `Cancelled`. Per-dependency and per-callable failures are logged and
/// folded into the `MergeReport` counters instead of aborting the merge.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The focal coordinate failed to split into `group:artifact:version`.
    #[error("malformed coordinate `{0}`: expected `group:artifact:version`")]
    CoordinateMalformed(String),

    /// The focal artifact has no partial call graph in the `GraphStore`.
    #[error("no partial call graph for focal package-version {0}")]
    FocalGraphMissing(u64),

    /// A single dependency's callables or partial graph couldn't be
    /// fetched. Never surfaced by a default merge — the dependency is
    /// logged and dropped from the closure instead (`MissingDepPolicy::Skip`)
    /// — but returned to callers who opt into `MissingDepPolicy::Fail`.
    #[error("failed to fetch callables for dependency {0}")]
    DependencyFetchFailed(u64),

    /// An external store failed in a way that cannot be degraded around
    /// (as opposed to a single dependency or callable being dropped).
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The cooperative `shouldAbort` check fired mid-resolution.
    #[error("merge cancelled")]
    Cancelled,

    /// A method URI could not be decomposed into a `Node`.
    #[error(transparent)]
    MalformedUri(#[from] MalformedUri),

    /// Invalid operational configuration.
    #[error("invalid merge configuration: {0}")]
    Config(String),

    /// A dynamic-dispatch call site was encountered under
    /// `DynamicSitePolicy::Fail`.
    #[error("dynamic call site rejected by policy: {0}")]
    DynamicSiteRejected(String),
}

impl MergeError {
    pub fn config(msg: impl Into<String>) -> Self {
        MergeError::Config(msg.into())
    }

    /// Stable category label for structured logging and test assertions.
    pub fn category(&self) -> &'static str {
        match self {
            MergeError::CoordinateMalformed(_) => "coordinate_malformed",
            MergeError::FocalGraphMissing(_) => "focal_graph_missing",
            MergeError::DependencyFetchFailed(_) => "dependency_fetch_failed",
            MergeError::StoreUnavailable(_) => "store_unavailable",
            MergeError::Cancelled => "cancelled",
            MergeError::MalformedUri(_) => "malformed_uri",
            MergeError::Config(_) => "config",
            MergeError::DynamicSiteRejected(_) => "dynamic_site_rejected",
        }
    }
}

/// Errors raised by the URI codec.
///
/// These are always attributable to a single callable; callers decide
/// whether that makes the whole merge fatal (focal node typing,
/// `MergeError::MalformedUri`) or just drops one dictionary entry
/// (logged and skipped, without ever constructing a `MergeError`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedUri {
    /// The entity component has no `/`-delimited namespace.
    #[error("missing namespace in URI `{0}`")]
    MissingNamespace(String),

    /// The signature's parentheses don't balance.
    #[error("unbalanced parentheses in signature `{0}`")]
    UnbalancedParentheses(String),

    /// A `%XX` escape was not followed by two hex digits.
    #[error("invalid percent-escape in URI `{0}`")]
    InvalidPercentEscape(String),
}

/// Result type alias for fasten-merger operations.
pub type Result<T> = std::result::Result<T, MergeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_stable() {
        assert_eq!(
            MergeError::CoordinateMalformed("x".into()).category(),
            "coordinate_malformed"
        );
        assert_eq!(MergeError::Cancelled.category(), "cancelled");
        assert_eq!(
            MergeError::DependencyFetchFailed(42).category(),
            "dependency_fetch_failed"
        );
    }

    #[test]
    fn malformed_uri_converts_into_merge_error() {
        let err: MergeError = MalformedUri::MissingNamespace("Foo.bar()V".into()).into();
        assert_eq!(err.category(), "malformed_uri");
    }
}
