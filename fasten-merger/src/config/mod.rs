//! Merge configuration
//!
//! Three operational knobs control merge behavior. This module is a
//! single-tier validating-constructor config, in contrast to a layered
//! preset/patch/YAML system — there's no "90% of users want a preset"
//! case here, so the extra tiers are dropped (see DESIGN.md).

use std::str::FromStr;

use crate::errors::MergeError;

/// What to do with a `dynamic` invocation site.
///
/// Defaults to "skip with warning"; `Fail` exists for
/// callers who want dynamic-dispatch sites treated as a hard error instead
/// of a silently-degraded result (e.g. CI gates that must not ship an
/// under-approximated graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DynamicSitePolicy {
    #[default]
    Warn,
    Drop,
    Fail,
}

impl FromStr for DynamicSitePolicy {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(Self::Warn),
            "drop" => Ok(Self::Drop),
            "fail" => Ok(Self::Fail),
            other => Err(MergeError::config(format!(
                "unrecognized dynamic-site-policy `{other}` (expected warn|drop|fail)"
            ))),
        }
    }
}

/// What to do when a dependency coordinate can't be resolved or its
/// partial graph can't be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingDepPolicy {
    #[default]
    Skip,
    Fail,
}

impl FromStr for MissingDepPolicy {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(MergeError::config(format!(
                "unrecognized missing-dep-policy `{other}` (expected skip|fail)"
            ))),
        }
    }
}

/// The full set of operational knobs exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeConfig {
    pub dynamic_site_policy: DynamicSitePolicy,
    pub missing_dep_policy: MissingDepPolicy,
    pub intern_type_uris: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            dynamic_site_policy: DynamicSitePolicy::default(),
            missing_dep_policy: MissingDepPolicy::default(),
            intern_type_uris: true,
        }
    }
}

impl MergeConfig {
    /// Build a config from string overrides
    /// (`dynamic-site-policy`, `missing-dep-policy`, `intern-type-uris`),
    /// falling back to the documented defaults for any key left unset.
    pub fn from_overrides(
        dynamic_site_policy: Option<&str>,
        missing_dep_policy: Option<&str>,
        intern_type_uris: Option<bool>,
    ) -> Result<Self, MergeError> {
        let mut config = Self::default();
        if let Some(v) = dynamic_site_policy {
            config.dynamic_site_policy = v.parse()?;
        }
        if let Some(v) = missing_dep_policy {
            config.missing_dep_policy = v.parse()?;
        }
        if let Some(v) = intern_type_uris {
            config.intern_type_uris = v;
        }
        Ok(config)
    }
}
