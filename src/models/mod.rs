//! Data models for triplerag.
//!
//! This module contains the core data structures shared by storage,
//! extraction, and query services.

mod document;
pub mod graph;
mod schema;

pub use document::{Document, DocumentId, TextChunk};
pub use graph::{EdgeRow, EntityNode, IS_A, Relation, Triple};
pub use schema::{ExtractionSchema, normalize_label};
