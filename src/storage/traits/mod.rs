//! Storage backend traits.

pub mod graph;
mod triple;

pub use graph::PropertyGraphStore;
pub use triple::TripleBackend;
