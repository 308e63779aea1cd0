//! Storage layer abstraction.
//!
//! Two layers, one on top of the other:
//! - **Triple client** ([`TripleBackend`]): an embedded graph database that
//!   stores raw `(subject, predicate, object)` facts
//! - **Graph store** ([`PropertyGraphStore`]): the contract the indexing
//!   pipeline writes entity nodes and relations through
//!
//! [`TripleGraphStore`] adapts the first to the second.

// Allow significant_drop_tightening - dropping database connections slightly early
// provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]

pub mod graph;
pub mod traits;
pub mod triple;

pub use graph::TripleGraphStore;
pub use traits::{PropertyGraphStore, TripleBackend};
pub use triple::{InMemoryTripleBackend, SqliteTripleBackend};

use crate::{Error, Result};
use std::path::PathBuf;

/// Returns the per-user data directory (`<local data dir>/triplerag`).
///
/// # Errors
///
/// Returns an error if the platform data directory cannot be determined.
pub fn get_user_data_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|b| b.data_local_dir().join("triplerag"))
        .ok_or_else(|| Error::OperationFailed {
            operation: "get_user_data_dir".to_string(),
            cause: "Could not determine user data directory".to_string(),
        })
}

/// Validates a graph name before it is used as a directory component.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the name is blank, contains a path
/// separator, or is a relative path component.
pub fn validate_graph_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("graph name must not be empty".to_string()));
    }
    if trimmed != name {
        return Err(Error::InvalidInput(format!(
            "graph name '{name}' has leading or trailing whitespace"
        )));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." || name.contains('\0') {
        return Err(Error::InvalidInput(format!(
            "graph name '{name}' must not contain path separators"
        )));
    }
    Ok(())
}
