/*
 * Domain Layer - Pure data model for the merger
 *
 * HEXAGONAL ARCHITECTURE:
 * - No external dependencies beyond serde (wire format) and std
 * - Only domain types; the merge algorithm itself lives in `features/`
 * - Infrastructure (stores) implements the ports declared here
 */

pub mod models;
pub mod ports;

pub use models::{
    CallableId, DependencyId, InvocationKind, InvocationSite, Node, PartialGraph, Signature,
    TypeUri,
};
pub use ports::{DependencyStore, EdgeMetadataStore, GraphStore, HierarchyRow};
