//! Graph store adapter integration tests.
//!
//! Runs the adapter contract against both triple clients:
//! - `SQLite` on disk (via `tempfile`)
//! - the in-memory client
//!
//! plus on-disk behavior: persistence across reopen and per-graph isolation.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use tempfile::TempDir;
use test_case::test_case;
use triplerag::models::{EntityNode, Relation, Triple};
use triplerag::storage::triple::GRAPH_DB_FILE;
use triplerag::storage::{
    InMemoryTripleBackend, PropertyGraphStore, SqliteTripleBackend, TripleBackend,
    TripleGraphStore,
};
use triplerag::Error;

/// Which triple client a test runs against.
#[derive(Debug, Clone, Copy)]
enum Backend {
    Sqlite,
    Memory,
}

/// Builds a store; the returned `TempDir` must outlive it.
fn store(backend: Backend) -> (Box<dyn PropertyGraphStore>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store: Box<dyn PropertyGraphStore> = match backend {
        Backend::Sqlite => Box::new(
            TripleGraphStore::open(dir.path(), "galactic_knowledge_base")
                .expect("Failed to open graph"),
        ),
        Backend::Memory => Box::new(TripleGraphStore::in_memory("galactic_knowledge_base")),
    };
    (store, dir)
}

#[test_case(Backend::Sqlite ; "sqlite")]
#[test_case(Backend::Memory ; "memory")]
fn test_node_is_readable_as_is_a(backend: Backend) {
    let (store, _dir) = store(backend);
    let node = EntityNode::new("Zephyr-7", "PLANET");

    store.upsert_nodes(std::slice::from_ref(&node)).unwrap();

    let triples = store.get(&node.name).unwrap();
    assert!(triples.iter().any(|t| t.as_array() == ["Zephyr-7", "is_a", "PLANET"]));
}

#[test_case(Backend::Sqlite ; "sqlite")]
#[test_case(Backend::Memory ; "memory")]
fn test_relation_is_readable_from_source(backend: Backend) {
    let (store, _dir) = store(backend);
    let rel = Relation::new("Zephyr-7", "LOCATED_IN", "Andromeda Sector");

    store.upsert_relations(std::slice::from_ref(&rel)).unwrap();

    assert_eq!(
        store.get("Zephyr-7").unwrap(),
        vec![Triple::new("Zephyr-7", "LOCATED_IN", "Andromeda Sector")]
    );
    // Only outgoing edges are returned.
    assert!(store.get("Andromeda Sector").unwrap().is_empty());
}

#[test_case(Backend::Sqlite ; "sqlite")]
#[test_case(Backend::Memory ; "memory")]
fn test_unknown_subject_is_empty(backend: Backend) {
    let (store, _dir) = store(backend);
    assert!(store.get("Milky Way").unwrap().is_empty());
}

#[test_case(Backend::Sqlite ; "sqlite")]
#[test_case(Backend::Memory ; "memory")]
fn test_duplicate_node_stored_twice(backend: Backend) {
    let (store, _dir) = store(backend);
    let node = EntityNode::new("Kryon", "SPECIES");

    store.upsert_nodes(std::slice::from_ref(&node)).unwrap();
    store.upsert_nodes(std::slice::from_ref(&node)).unwrap();

    let triples = store.get("Kryon").unwrap();
    assert_eq!(triples.len(), 2);
    assert_eq!(triples[0], triples[1]);
}

#[test_case(Backend::Sqlite ; "sqlite")]
#[test_case(Backend::Memory ; "memory")]
fn test_get_preserves_insertion_order(backend: Backend) {
    let (store, _dir) = store(backend);
    store
        .upsert_nodes(&[EntityNode::new("Great Stellar Gate", "TECHNOLOGY")])
        .unwrap();
    store
        .upsert_relations(&[
            Relation::new("Great Stellar Gate", "MADE_OF", "Chronos-Steel"),
            Relation::new("Great Stellar Gate", "ALLOWS_TRAVEL_TO", "Milky Way"),
        ])
        .unwrap();

    let predicates: Vec<String> = store
        .get("Great Stellar Gate")
        .unwrap()
        .into_iter()
        .map(|t| t.predicate)
        .collect();
    assert_eq!(predicates, vec!["is_a", "MADE_OF", "ALLOWS_TRAVEL_TO"]);
}

#[test_case(Backend::Sqlite ; "sqlite")]
#[test_case(Backend::Memory ; "memory")]
fn test_empty_batches_are_noops(backend: Backend) {
    let (store, _dir) = store(backend);
    store.upsert_nodes(&[]).unwrap();
    store.upsert_relations(&[]).unwrap();
    assert!(store.get("").unwrap().is_empty());
}

#[test_case(Backend::Sqlite ; "sqlite")]
#[test_case(Backend::Memory ; "memory")]
fn test_empty_names_and_labels_are_written(backend: Backend) {
    let (store, _dir) = store(backend);

    store.upsert_nodes(&[EntityNode::new("", "PLANET")]).unwrap();
    store.upsert_relations(&[Relation::new("Kryon", "", "")]).unwrap();

    assert_eq!(store.get("").unwrap(), vec![Triple::new("", "is_a", "PLANET")]);
    assert_eq!(store.get("Kryon").unwrap(), vec![Triple::new("Kryon", "", "")]);
}

#[test]
fn test_persistence_across_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let store = TripleGraphStore::open(dir.path(), "galactic_knowledge_base").unwrap();
        store
            .upsert_relations(&[Relation::new("Kryons", "BUILT", "Great Stellar Gate")])
            .unwrap();
    }

    assert!(
        dir.path()
            .join("galactic_knowledge_base")
            .join(GRAPH_DB_FILE)
            .exists()
    );

    let reopened = TripleGraphStore::open(dir.path(), "galactic_knowledge_base").unwrap();
    assert_eq!(
        reopened.get("Kryons").unwrap(),
        vec![Triple::new("Kryons", "BUILT", "Great Stellar Gate")]
    );
}

#[test]
fn test_graphs_are_isolated() {
    let dir = TempDir::new().unwrap();
    let a = TripleGraphStore::open(dir.path(), "graph_a").unwrap();
    let b = TripleGraphStore::open(dir.path(), "graph_b").unwrap();

    a.upsert_nodes(&[EntityNode::new("Zephyr-7", "PLANET")]).unwrap();

    assert_eq!(a.get("Zephyr-7").unwrap().len(), 1);
    assert!(b.get("Zephyr-7").unwrap().is_empty());
    assert_eq!(a.graph_name(), "graph_a");
}

#[test_case("" ; "empty")]
#[test_case("../escape" ; "parent traversal")]
#[test_case("a/b" ; "separator")]
fn test_invalid_graph_names_rejected(name: &str) {
    let dir = TempDir::new().unwrap();
    let err = TripleGraphStore::open(dir.path(), name).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_adapter_over_explicit_backends() {
    let sqlite = TripleGraphStore::new(SqliteTripleBackend::in_memory("lore").unwrap());
    let memory = TripleGraphStore::new(InMemoryTripleBackend::new("lore"));

    for store in [&sqlite as &dyn PropertyGraphStore, &memory] {
        store
            .upsert_nodes(&[EntityNode::new("Chronos-Steel", "MATERIAL")])
            .unwrap();
        store
            .upsert_relations(&[Relation::new("Chronos-Steel", "HARVESTED_FROM", "dying stars")])
            .unwrap();
    }

    assert_eq!(sqlite.backend().triple_count().unwrap(), 2);
    assert_eq!(memory.backend().triple_count().unwrap(), 2);
    assert_eq!(
        sqlite.get("Chronos-Steel").unwrap(),
        memory.get("Chronos-Steel").unwrap()
    );
}
