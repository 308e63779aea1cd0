//! Embedded triple-store clients.
//!
//! This module provides implementations of the [`TripleBackend`] trait.
//!
//! # Available Backends
//!
//! | Backend | Use Case | Features |
//! |---------|----------|----------|
//! | [`SqliteTripleBackend`] | Default; embedded | Persistent, insertion-ordered |
//! | [`InMemoryTripleBackend`] | Testing | Fast, no persistence |
//!
//! # Example
//!
//! ```rust,ignore
//! use triplerag::storage::triple::SqliteTripleBackend;
//! use triplerag::storage::TripleBackend;
//!
//! let graph = SqliteTripleBackend::open(".triplerag", "galactic_knowledge_base")?;
//! graph.put("Zephyr-7", "LOCATED_IN", "Andromeda Sector")?;
//! for row in graph.out_edges("Zephyr-7")? {
//!     println!("{} -> {}", row.edge, row.id);
//! }
//! ```

mod memory;
mod sqlite;

pub use memory::InMemoryTripleBackend;
pub use sqlite::{GRAPH_DB_FILE, SqliteTripleBackend};

pub use crate::storage::traits::TripleBackend;
