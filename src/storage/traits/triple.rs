//! Triple client trait for embedded graph databases.
//!
//! A triple client stores raw `(subject, predicate, object)` facts in a named
//! graph and answers one-hop traversals with tagged rows.
//!
//! # Available Implementations
//!
//! | Backend | Use Case | Features |
//! |---------|----------|----------|
//! | `SqliteTripleBackend` | Default; embedded | Persistent, one file per graph |
//! | `InMemoryTripleBackend` | Testing | Fast, no persistence |

use crate::Result;
use crate::models::EdgeRow;

/// Trait for embedded triple-store clients.
///
/// # Implementor Notes
///
/// - Methods use `&self`; use interior mutability for the connection or map
/// - `put` appends; it never deduplicates
/// - `out_edges` returns rows in insertion order
pub trait TripleBackend: Send + Sync {
    /// Name of the graph this handle addresses.
    fn graph_name(&self) -> &str;

    /// Appends one triple.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put(&self, subject: &str, predicate: &str, object: &str) -> Result<()>;

    /// Follows every outgoing edge of `subject` one hop.
    ///
    /// Returns an empty vector if the vertex is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn out_edges(&self, subject: &str) -> Result<Vec<EdgeRow>>;

    /// Returns the number of stored triples.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn triple_count(&self) -> Result<usize>;
}
