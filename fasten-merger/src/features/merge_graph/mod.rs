pub mod domain;

pub use domain::{MergedGraph, MergedGraphBuilder, WireGraph};
