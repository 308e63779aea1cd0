//! Property-graph store over an embedded triple client.

use crate::Result;
use crate::models::{EntityNode, IS_A, Relation, Triple};
use crate::storage::traits::{PropertyGraphStore, TripleBackend};
use crate::storage::triple::{InMemoryTripleBackend, SqliteTripleBackend};
use std::path::Path;
use tracing::instrument;

/// Adapter that satisfies [`PropertyGraphStore`] with a [`TripleBackend`].
///
/// Holds a handle to the triple client, not the data. Every node or relation
/// becomes exactly one `put`, and `get` is a single one-hop traversal.
#[derive(Debug)]
pub struct TripleGraphStore<B: TripleBackend = SqliteTripleBackend> {
    backend: B,
}

impl TripleGraphStore<SqliteTripleBackend> {
    /// Opens (or creates) the named graph under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph name is invalid or the database cannot
    /// be opened.
    pub fn open(data_dir: impl AsRef<Path>, graph_name: &str) -> Result<Self> {
        SqliteTripleBackend::open(data_dir, graph_name).map(Self::new)
    }
}

impl TripleGraphStore<InMemoryTripleBackend> {
    /// Creates a store over a fresh in-memory graph.
    #[must_use]
    pub fn in_memory(graph_name: impl Into<String>) -> Self {
        Self::new(InMemoryTripleBackend::new(graph_name))
    }
}

impl<B: TripleBackend> TripleGraphStore<B> {
    /// Wraps an existing triple client.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying triple client.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the name of the addressed graph.
    #[must_use]
    pub fn graph_name(&self) -> &str {
        self.backend.graph_name()
    }
}

impl<B: TripleBackend> PropertyGraphStore for TripleGraphStore<B> {
    #[instrument(skip_all, fields(graph = %self.backend.graph_name(), count = nodes.len()))]
    fn upsert_nodes(&self, nodes: &[EntityNode]) -> Result<()> {
        for node in nodes {
            self.backend.put(&node.name, IS_A, &node.label)?;
        }
        Ok(())
    }

    #[instrument(skip_all, fields(graph = %self.backend.graph_name(), count = relations.len()))]
    fn upsert_relations(&self, relations: &[Relation]) -> Result<()> {
        for rel in relations {
            // Subject (source) -> predicate (label) -> object (target)
            self.backend.put(&rel.source_id, &rel.label, &rel.target_id)?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(graph = %self.backend.graph_name()))]
    fn get(&self, subject: &str) -> Result<Vec<Triple>> {
        let rows = self.backend.out_edges(subject)?;
        Ok(rows
            .into_iter()
            .map(|row| Triple::new(subject, row.edge, row.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::models::EdgeRow;
    use std::sync::Mutex;

    #[test]
    fn test_node_becomes_is_a_triple() {
        let store = TripleGraphStore::in_memory("test");
        store
            .upsert_nodes(&[EntityNode::new("Chronos-Steel", "MATERIAL")])
            .unwrap();

        assert_eq!(
            store.get("Chronos-Steel").unwrap(),
            vec![Triple::new("Chronos-Steel", "is_a", "MATERIAL")]
        );
    }

    #[test]
    fn test_relation_written_unchanged() {
        let store = TripleGraphStore::in_memory("test");
        store
            .upsert_relations(&[Relation::new("Great Stellar Gate", "MADE_OF", "Chronos-Steel")])
            .unwrap();

        let triples = store.get("Great Stellar Gate").unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(
            triples[0].as_array(),
            ["Great Stellar Gate", "MADE_OF", "Chronos-Steel"]
        );
    }

    #[test]
    fn test_relation_does_not_require_nodes() {
        let store = TripleGraphStore::in_memory("test");
        store
            .upsert_relations(&[Relation::new("ghost", "HAUNTS", "nowhere")])
            .unwrap();
        assert_eq!(store.get("ghost").unwrap().len(), 1);
        assert!(store.get("nowhere").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_node_gives_duplicate_triples() {
        let store = TripleGraphStore::in_memory("test");
        let node = EntityNode::new("Kryon", "SPECIES");
        store.upsert_nodes(&[node.clone()]).unwrap();
        store.upsert_nodes(&[node]).unwrap();

        let triples = store.get("Kryon").unwrap();
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0], triples[1]);
    }

    #[test]
    fn test_get_unknown_subject() {
        let store = TripleGraphStore::in_memory("test");
        assert!(store.get("Milky Way").unwrap().is_empty());
    }

    /// Triple client that fails after a fixed number of writes.
    struct FailingBackend {
        allowed: usize,
        written: Mutex<Vec<(String, String, String)>>,
    }

    impl TripleBackend for FailingBackend {
        fn graph_name(&self) -> &str {
            "failing"
        }

        fn put(&self, subject: &str, predicate: &str, object: &str) -> Result<()> {
            let mut written = self.written.lock().unwrap();
            if written.len() >= self.allowed {
                return Err(Error::OperationFailed {
                    operation: "put_triple".to_string(),
                    cause: "disk full".to_string(),
                });
            }
            written.push((subject.into(), predicate.into(), object.into()));
            Ok(())
        }

        fn out_edges(&self, _subject: &str) -> Result<Vec<EdgeRow>> {
            Err(Error::OperationFailed {
                operation: "out_edges".to_string(),
                cause: "connection lost".to_string(),
            })
        }

        fn triple_count(&self) -> Result<usize> {
            Ok(self.written.lock().unwrap().len())
        }
    }

    #[test]
    fn test_errors_propagate_unmodified() {
        let store = TripleGraphStore::new(FailingBackend {
            allowed: 1,
            written: Mutex::new(Vec::new()),
        });

        let err = store
            .upsert_nodes(&[EntityNode::new("a", "A"), EntityNode::new("b", "B")])
            .unwrap_err();
        assert_eq!(err.to_string(), "operation 'put_triple' failed: disk full");
        // No rollback: the first write stays.
        assert_eq!(store.backend().triple_count().unwrap(), 1);

        let err = store.get("a").unwrap_err();
        assert_eq!(err.to_string(), "operation 'out_edges' failed: connection lost");
    }
}
