//! Business logic services.
//!
//! Services orchestrate the graph store and the LLM provider:
//! - [`SentenceSplitter`]: document chunking
//! - [`SchemaExtractor`]: schema-constrained triplet extraction
//! - [`PropertyGraphIndex`]: chunk, extract, and write through the store
//! - [`QueryEngine`]: keyword retrieval and answer synthesis

mod chunking;
mod extraction;
mod index;
mod query;

pub use chunking::SentenceSplitter;
pub use extraction::{Extraction, GraphExtractor, SchemaExtractor};
pub use index::{IndexStats, PropertyGraphIndex};
pub use query::{
    EMPTY_RESPONSE, QueryConfig, QueryEngine, Response, ResponseSynthesizer, SynonymRetriever,
};
