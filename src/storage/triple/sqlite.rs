//! `SQLite` triple store.
//!
//! Stores every fact as one row of the `triples` table. A graph opened with
//! [`SqliteTripleBackend::open`] lives at `<data_dir>/<graph_name>/graph.db`.

// SQLite returns i64 for COUNT(*); triple counts are non-negative.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use crate::models::EdgeRow;
use crate::storage::traits::TripleBackend;
use crate::storage::validate_graph_name;
use crate::{Error, Result, current_timestamp};
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::instrument;

/// File name of the database inside a graph directory.
pub const GRAPH_DB_FILE: &str = "graph.db";

/// Helper to acquire mutex lock with poison recovery.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Triple store mutex was poisoned, recovering");
            metrics::counter!("triple_store_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// `SQLite`-based triple store.
///
/// # Concurrency Model
///
/// Uses a `Mutex<Connection>` for thread-safe access. WAL mode and
/// `busy_timeout` let a second process read while this one writes.
///
/// # Schema
///
/// One table, `triples`, keyed by an autoincrement id so that duplicates are
/// kept and traversal preserves insertion order. Rows carry the graph name,
/// so several graphs may share one file.
pub struct SqliteTripleBackend {
    /// Connection to the `SQLite` database.
    conn: Mutex<Connection>,
    /// Graph addressed by this handle.
    graph_name: String,
    /// Path to the database (None for in-memory).
    db_path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteTripleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTripleBackend")
            .field("graph_name", &self.graph_name)
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl SqliteTripleBackend {
    /// Opens (or creates) the named graph under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph name is invalid, the directory cannot be
    /// created, or the database cannot be opened.
    pub fn open(data_dir: impl AsRef<Path>, graph_name: &str) -> Result<Self> {
        validate_graph_name(graph_name)?;
        let graph_dir = data_dir.as_ref().join(graph_name);
        std::fs::create_dir_all(&graph_dir).map_err(|e| Error::OperationFailed {
            operation: "create_graph_dir".to_string(),
            cause: format!("{}: {e}", graph_dir.display()),
        })?;
        Self::new(graph_dir.join(GRAPH_DB_FILE), graph_name)
    }

    /// Opens a graph stored in an explicit database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>, graph_name: &str) -> Result<Self> {
        validate_graph_name(graph_name)?;
        let db_path = db_path.into();
        let conn = Connection::open(&db_path).map_err(|e| Error::OperationFailed {
            operation: "open_triple_store".to_string(),
            cause: e.to_string(),
        })?;

        let backend = Self {
            conn: Mutex::new(conn),
            graph_name: graph_name.to_string(),
            db_path: Some(db_path),
        };

        backend.initialize()?;
        tracing::debug!(graph = %backend.graph_name, path = ?backend.db_path, "Opened triple store");
        Ok(backend)
    }

    /// Creates an in-memory `SQLite` triple store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory(graph_name: &str) -> Result<Self> {
        validate_graph_name(graph_name)?;
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_triple_store_memory".to_string(),
            cause: e.to_string(),
        })?;

        let backend = Self {
            conn: Mutex::new(conn),
            graph_name: graph_name.to_string(),
            db_path: None,
        };

        backend.initialize()?;
        Ok(backend)
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Initializes the database schema.
    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");
        let _ = conn.pragma_update(None, "busy_timeout", "5000");

        conn.execute(
            "CREATE TABLE IF NOT EXISTS triples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                graph TEXT NOT NULL,
                subject TEXT NOT NULL,
                predicate TEXT NOT NULL,
                object TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_triples_table".to_string(),
            cause: e.to_string(),
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_triples_graph_subject ON triples(graph, subject)",
            [],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_triples_index".to_string(),
            cause: e.to_string(),
        })?;

        Ok(())
    }
}

impl TripleBackend for SqliteTripleBackend {
    fn graph_name(&self) -> &str {
        &self.graph_name
    }

    #[instrument(skip(self), fields(graph = %self.graph_name))]
    fn put(&self, subject: &str, predicate: &str, object: &str) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        conn.execute(
            "INSERT INTO triples (graph, subject, predicate, object, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.graph_name,
                subject,
                predicate,
                object,
                current_timestamp() as i64
            ],
        )
        .map_err(|e| Error::OperationFailed {
            operation: "put_triple".to_string(),
            cause: e.to_string(),
        })?;

        metrics::counter!("triple_store_puts_total").increment(1);
        Ok(())
    }

    #[instrument(skip(self), fields(graph = %self.graph_name))]
    fn out_edges(&self, subject: &str) -> Result<Vec<EdgeRow>> {
        let conn = acquire_lock(&self.conn);
        let mut stmt = conn
            .prepare_cached(
                "SELECT predicate, object FROM triples
                 WHERE graph = ?1 AND subject = ?2
                 ORDER BY id",
            )
            .map_err(|e| Error::OperationFailed {
                operation: "out_edges_prepare".to_string(),
                cause: e.to_string(),
            })?;

        let rows = stmt
            .query_map(params![self.graph_name, subject], |row| {
                Ok(EdgeRow {
                    edge: row.get(0)?,
                    id: row.get(1)?,
                })
            })
            .and_then(|mapped| mapped.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| Error::OperationFailed {
                operation: "out_edges".to_string(),
                cause: e.to_string(),
            })?;

        metrics::counter!("triple_store_queries_total").increment(1);
        tracing::trace!(rows = rows.len(), "Traversed outgoing edges");
        Ok(rows)
    }

    fn triple_count(&self) -> Result<usize> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM triples WHERE graph = ?1",
                params![self.graph_name],
                |row| row.get(0),
            )
            .map_err(|e| Error::OperationFailed {
                operation: "count_triples".to_string(),
                cause: e.to_string(),
            })?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_out_edges() {
        let backend = SqliteTripleBackend::in_memory("test").unwrap();
        backend.put("Zephyr-7", "LOCATED_IN", "Andromeda Sector").unwrap();
        backend.put("Zephyr-7", "is_a", "PLANET").unwrap();

        let rows = backend.out_edges("Zephyr-7").unwrap();
        assert_eq!(
            rows,
            vec![
                EdgeRow::new("LOCATED_IN", "Andromeda Sector"),
                EdgeRow::new("is_a", "PLANET"),
            ]
        );
    }

    #[test]
    fn test_unknown_subject_is_empty() {
        let backend = SqliteTripleBackend::in_memory("test").unwrap();
        assert!(backend.out_edges("Nowhere").unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let backend = SqliteTripleBackend::in_memory("test").unwrap();
        backend.put("a", "b", "c").unwrap();
        backend.put("a", "b", "c").unwrap();

        assert_eq!(backend.out_edges("a").unwrap().len(), 2);
        assert_eq!(backend.triple_count().unwrap(), 2);
    }

    #[test]
    fn test_only_outgoing_edges() {
        let backend = SqliteTripleBackend::in_memory("test").unwrap();
        backend.put("Kryons", "BUILT", "Great Stellar Gate").unwrap();

        assert!(backend.out_edges("Great Stellar Gate").unwrap().is_empty());
    }

    #[test]
    fn test_empty_subject_and_predicate_round_trip() {
        let backend = SqliteTripleBackend::in_memory("test").unwrap();
        backend.put("", "p", "o").unwrap();
        backend.put("s", "", "o").unwrap();

        assert_eq!(backend.out_edges("").unwrap(), vec![EdgeRow::new("p", "o")]);
        assert_eq!(backend.out_edges("s").unwrap(), vec![EdgeRow::new("", "o")]);
        assert_eq!(backend.triple_count().unwrap(), 2);
    }

    #[test]
    fn test_open_creates_graph_directory() {
        let dir = TempDir::new().unwrap();
        let backend = SqliteTripleBackend::open(dir.path(), "lore").unwrap();

        let expected = dir.path().join("lore").join(GRAPH_DB_FILE);
        assert_eq!(backend.db_path(), Some(expected.as_path()));
        assert!(expected.exists());
        assert_eq!(backend.graph_name(), "lore");
    }

    #[test]
    fn test_open_rejects_bad_graph_name() {
        let dir = TempDir::new().unwrap();
        assert!(SqliteTripleBackend::open(dir.path(), "../escape").is_err());
        assert!(SqliteTripleBackend::open(dir.path(), "").is_err());
    }

    #[test]
    fn test_graphs_sharing_a_file_are_isolated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shared.db");
        let first = SqliteTripleBackend::new(&path, "first").unwrap();
        first.put("x", "p", "y").unwrap();
        drop(first);

        let second = SqliteTripleBackend::new(&path, "second").unwrap();
        assert!(second.out_edges("x").unwrap().is_empty());
        assert_eq!(second.triple_count().unwrap(), 0);
    }
}
