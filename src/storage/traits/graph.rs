//! Graph store trait for property-graph indexing.
//!
//! The indexing pipeline and the query engine only ever talk to this
//! contract. Any graph store variant must provide the three operations
//! below with the listed behavior.
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `upsert_nodes` | One `(name, "is_a", label)` triple per node |
//! | `upsert_relations` | One `(source_id, label, target_id)` triple per relation |
//! | `get` | Outgoing edges of one subject, one hop |
//!
//! # Error Modes and Guarantees
//!
//! Errors from the underlying store propagate unmodified. Implementations add
//! no retry, deduplication, existence checks, or transactional grouping: a
//! failure halfway through a batch leaves the earlier writes in place.
//!
//! # Example
//!
//! ```rust,ignore
//! use triplerag::storage::{PropertyGraphStore, TripleGraphStore};
//! use triplerag::models::EntityNode;
//!
//! let store = TripleGraphStore::in_memory("demo");
//! store.upsert_nodes(&[EntityNode::new("Zephyr-7", "PLANET")])?;
//! let facts = store.get("Zephyr-7")?;
//! ```

use crate::Result;
use crate::models::{EntityNode, Relation, Triple};

/// Trait for property-graph stores.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn PropertyGraphStore>`
/// - Each node or relation maps to exactly one triple insertion
/// - `get` traverses a single hop and preserves insertion order
pub trait PropertyGraphStore: Send + Sync {
    /// Writes each entity node as `(name, "is_a", label)`.
    ///
    /// Writing the same node twice stores two identical triples.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the underlying store.
    fn upsert_nodes(&self, nodes: &[EntityNode]) -> Result<()>;

    /// Writes each relation as `(source_id, label, target_id)`.
    ///
    /// Neither endpoint has to exist as a node.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the underlying store.
    fn upsert_relations(&self, relations: &[Relation]) -> Result<()>;

    /// Returns every outgoing edge of `subject` as `[subject, edge, destination]`.
    ///
    /// Returns an empty vector for unknown subjects or subjects without
    /// outgoing edges.
    ///
    /// # Errors
    ///
    /// Returns the error raised by the underlying store.
    fn get(&self, subject: &str) -> Result<Vec<Triple>>;
}

impl<T: PropertyGraphStore + ?Sized> PropertyGraphStore for std::sync::Arc<T> {
    fn upsert_nodes(&self, nodes: &[EntityNode]) -> Result<()> {
        (**self).upsert_nodes(nodes)
    }

    fn upsert_relations(&self, relations: &[Relation]) -> Result<()> {
        (**self).upsert_relations(relations)
    }

    fn get(&self, subject: &str) -> Result<Vec<Triple>> {
        (**self).get(subject)
    }
}

impl<T: PropertyGraphStore + ?Sized> PropertyGraphStore for &T {
    fn upsert_nodes(&self, nodes: &[EntityNode]) -> Result<()> {
        (**self).upsert_nodes(nodes)
    }

    fn upsert_relations(&self, relations: &[Relation]) -> Result<()> {
        (**self).upsert_relations(relations)
    }

    fn get(&self, subject: &str) -> Result<Vec<Triple>> {
        (**self).get(subject)
    }
}
