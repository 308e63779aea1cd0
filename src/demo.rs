//! The Zephyr-7 demo: index a short piece of space lore, then ask about it.

use crate::Result;
use crate::config::{ExtractionConfig, TripleragConfig};
use crate::llm::LlmProvider;
use crate::models::{Document, ExtractionSchema};
use crate::services::{PropertyGraphIndex, Response, SchemaExtractor, SentenceSplitter};
use crate::storage::{PropertyGraphStore, TripleGraphStore};
use std::sync::Arc;

/// Graph the demo writes to.
pub const GRAPH_NAME: &str = "galactic_knowledge_base";

/// The lore indexed by the demo.
pub const SPACE_LORE: &str = "
The planet Zephyr-7 is located in the Andromeda Sector.
It is inhabited by the Kryon species, who are master architects.
The Kryons built the Great Stellar Gate using Chronos-Steel.
Chronos-Steel is a rare alloy harvested from dying stars.
The Great Stellar Gate allows for instantaneous travel to the Milky Way.
";

/// Entity labels the extractor may emit.
pub const POSSIBLE_ENTITIES: [&str; 5] = ["PLANET", "SPECIES", "TECHNOLOGY", "MATERIAL", "SECTOR"];

/// Relation labels the extractor may emit.
pub const POSSIBLE_RELATIONS: [&str; 5] = [
    "LOCATED_IN",
    "INHABITED_BY",
    "BUILT",
    "MADE_OF",
    "ALLOWS_TRAVEL_TO",
];

/// The question the demo asks.
pub const QUESTION: &str =
    "What material was used to build the gate on Zephyr-7, and what does it allow?";

/// Returns the demo vocabulary.
#[must_use]
pub fn schema() -> ExtractionSchema {
    ExtractionSchema::new(POSSIBLE_ENTITIES, POSSIBLE_RELATIONS)
}

/// Wires a schema extractor and splitter from extraction settings.
///
/// `schema.strict` is overridden by `settings.strict`.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] if the chunk settings are invalid.
pub fn build_index<S: PropertyGraphStore>(
    store: S,
    llm: Arc<dyn LlmProvider>,
    schema: ExtractionSchema,
    settings: &ExtractionConfig,
) -> Result<PropertyGraphIndex<S>> {
    let splitter = SentenceSplitter::new(settings.chunk_size, settings.chunk_overlap)?;
    let extractor = SchemaExtractor::new(llm, schema.with_strict(settings.strict))
        .with_max_triplets_per_chunk(settings.max_triplets_per_chunk);
    Ok(PropertyGraphIndex::new(store, vec![Box::new(extractor)]).with_splitter(splitter))
}

/// Runs the demo against an existing store.
///
/// # Errors
///
/// Returns the first extraction, store, or LLM error.
pub fn run_with_store<S: PropertyGraphStore>(
    store: S,
    llm: Arc<dyn LlmProvider>,
    config: &TripleragConfig,
) -> Result<Response> {
    let index = build_index(store, Arc::clone(&llm), schema(), &config.extraction)?;
    let stats = index.insert(&Document::new(SPACE_LORE).with_metadata("source", "demo"))?;
    tracing::info!(
        chunks = stats.chunks,
        nodes = stats.nodes,
        relations = stats.relations,
        "Indexed demo lore"
    );

    index
        .as_query_engine(llm, config.retrieval.into())
        .query(QUESTION)
}

/// Opens the configured graph, indexes the lore, and asks [`QUESTION`].
///
/// Re-running appends the same triples again; the store does not
/// de-duplicate.
///
/// # Errors
///
/// Returns an error if the graph cannot be opened, or the first extraction,
/// store, or LLM error.
pub fn run(config: &TripleragConfig, llm: Arc<dyn LlmProvider>) -> Result<Response> {
    let store = TripleGraphStore::open(&config.data_dir, &config.graph_name)?;
    run_with_store(store, llm, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lore_has_five_sentences() {
        let chunks = SentenceSplitter::new(5, 0).unwrap().split_text(SPACE_LORE);
        // Every sentence is longer than five words, so each is its own chunk.
        assert_eq!(chunks.len(), 5);
        assert!(chunks[2].contains("Great Stellar Gate using Chronos-Steel"));
    }

    #[test]
    fn test_schema_is_strict_demo_vocabulary() {
        let schema = schema();
        assert!(schema.strict);
        assert_eq!(schema.possible_entities.len(), 5);
        assert_eq!(schema.resolve_relation("made_of").as_deref(), Some("MADE_OF"));
        assert_eq!(schema.resolve_entity("person"), None);
    }

    #[test]
    fn test_build_index_rejects_bad_chunking() {
        struct Never;
        impl LlmProvider for Never {
            fn name(&self) -> &'static str {
                "never"
            }
            fn complete(&self, _prompt: &str) -> Result<String> {
                unreachable!()
            }
        }

        let settings = ExtractionConfig {
            chunk_size: 10,
            chunk_overlap: 10,
            ..ExtractionConfig::default()
        };
        let result = build_index(
            TripleGraphStore::in_memory("test"),
            Arc::new(Never),
            schema(),
            &settings,
        );
        assert!(result.is_err());
    }
}
