pub mod application;
pub mod domain;

pub use application::resolve;
pub use domain::{ResolutionOutcome, ResolvedArc, UnresolvedSite};
