//! In-memory triple store for testing.
//!
//! Provides a fast, non-persistent implementation of [`TripleBackend`] for use
//! in unit tests and development scenarios.

use crate::models::EdgeRow;
use crate::storage::traits::TripleBackend;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory triple store.
///
/// Uses `RwLock` for thread-safe access with reader-writer semantics.
/// Data is not persisted between runs.
#[derive(Debug)]
pub struct InMemoryTripleBackend {
    graph_name: String,
    edges: RwLock<HashMap<String, Vec<EdgeRow>>>,
}

impl InMemoryTripleBackend {
    /// Creates a new empty in-memory triple store.
    #[must_use]
    pub fn new(graph_name: impl Into<String>) -> Self {
        Self {
            graph_name: graph_name.into(),
            edges: RwLock::new(HashMap::new()),
        }
    }

    fn lock_error(operation: &str) -> Error {
        Error::OperationFailed {
            operation: operation.to_string(),
            cause: "lock poisoned".to_string(),
        }
    }
}

impl TripleBackend for InMemoryTripleBackend {
    fn graph_name(&self) -> &str {
        &self.graph_name
    }

    fn put(&self, subject: &str, predicate: &str, object: &str) -> Result<()> {
        let mut edges = self
            .edges
            .write()
            .map_err(|_| Self::lock_error("put_triple"))?;
        edges
            .entry(subject.to_string())
            .or_default()
            .push(EdgeRow::new(predicate, object));
        Ok(())
    }

    fn out_edges(&self, subject: &str) -> Result<Vec<EdgeRow>> {
        let edges = self
            .edges
            .read()
            .map_err(|_| Self::lock_error("out_edges"))?;
        Ok(edges.get(subject).cloned().unwrap_or_default())
    }

    fn triple_count(&self) -> Result<usize> {
        let edges = self
            .edges
            .read()
            .map_err(|_| Self::lock_error("count_triples"))?;
        Ok(edges.values().map(Vec::len).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let backend = InMemoryTripleBackend::new("test");
        backend.put("Kryons", "BUILT", "Great Stellar Gate").unwrap();
        backend.put("Kryons", "is_a", "SPECIES").unwrap();

        let rows = backend.out_edges("Kryons").unwrap();
        assert_eq!(rows[0], EdgeRow::new("BUILT", "Great Stellar Gate"));
        assert_eq!(rows[1], EdgeRow::new("is_a", "SPECIES"));
    }

    #[test]
    fn test_duplicates_and_count() {
        let backend = InMemoryTripleBackend::new("test");
        backend.put("a", "b", "c").unwrap();
        backend.put("a", "b", "c").unwrap();
        backend.put("d", "e", "f").unwrap();

        assert_eq!(backend.out_edges("a").unwrap().len(), 2);
        assert_eq!(backend.triple_count().unwrap(), 3);
    }

    #[test]
    fn test_empty_fields_stored_unchanged() {
        let backend = InMemoryTripleBackend::new("test");
        backend.put("", "", "").unwrap();
        backend.put("", "is_a", "PLANET").unwrap();

        let edges = backend.out_edges("").unwrap();
        assert_eq!(edges, vec![EdgeRow::new("", ""), EdgeRow::new("is_a", "PLANET")]);
    }
}
