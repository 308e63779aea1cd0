//! # Triplerag
//!
//! Retrieval-augmented question answering over an embedded triple-store
//! knowledge graph.
//!
//! Triplerag indexes free text into `(subject, predicate, object)` facts using a
//! schema-constrained LLM extractor, stores them in a named local graph, and
//! answers natural-language questions from the facts it reads back.
//!
//! ## Layers
//!
//! - Embedded triple client ([`storage::TripleBackend`]): `put` plus one-hop traversal
//! - Graph store adapter ([`storage::PropertyGraphStore`]): `upsert_nodes`,
//!   `upsert_relations`, `get`
//! - Indexing pipeline ([`services::PropertyGraphIndex`]): chunk, extract, upsert
//! - Query engine ([`services::QueryEngine`]): keyword expansion, retrieval, synthesis
//!
//! ## Example
//!
//! ```rust,ignore
//! use triplerag::models::Document;
//! use triplerag::services::{PropertyGraphIndex, SchemaExtractor, QueryConfig};
//! use triplerag::storage::TripleGraphStore;
//!
//! let store = TripleGraphStore::open(".triplerag", "galactic_knowledge_base")?;
//! let extractor = SchemaExtractor::new(llm.clone(), schema);
//! let index = PropertyGraphIndex::from_documents(
//!     vec![Document::new(text)],
//!     store,
//!     vec![Box::new(extractor)],
//! )?;
//! let response = index.as_query_engine(llm, QueryConfig::default()).query("...")?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod demo;
pub mod llm;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::TripleragConfig;
pub use llm::LlmProvider;
pub use models::{Document, EdgeRow, EntityNode, ExtractionSchema, Relation, TextChunk, Triple};
pub use services::{PropertyGraphIndex, QueryEngine, Response};
pub use storage::{PropertyGraphStore, TripleBackend, TripleGraphStore};

/// Error type for triplerag operations.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Bad graph name, bad chunk settings, empty question |
/// | `OperationFailed` | `SQLite` errors, HTTP errors, unreadable config files |
/// | `NotConfigured` | LLM credential missing |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A graph name is empty or contains path separators
    /// - Chunk overlap is not smaller than the chunk size
    /// - A query string is blank
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` database operations fail
    /// - An LLM HTTP request fails or returns a non-success status
    /// - Configuration files cannot be read or parsed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A required setting or credential is missing.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// Result type alias for triplerag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
