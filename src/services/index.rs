//! Property-graph index: chunk, extract, write.
//!
//! # Architecture
//!
//! ```text
//! Document
//!     │
//!     ▼
//! SentenceSplitter ──▶ chunk 0, chunk 1, ...
//!     │
//!     ▼
//! GraphExtractor (each extractor × each chunk)
//!     │
//!     ▼
//! EntityNode (deduped per batch) + Relation
//!     │
//!     ▼
//! PropertyGraphStore::upsert_nodes / upsert_relations
//! ```

use crate::Result;
use crate::llm::LlmProvider;
use crate::models::{Document, EntityNode};
use crate::services::chunking::SentenceSplitter;
use crate::services::extraction::{Extraction, GraphExtractor};
use crate::services::query::{QueryConfig, QueryEngine};
use crate::storage::PropertyGraphStore;
use std::collections::HashSet;
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::instrument;

/// Counts produced by one or more `insert` calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Chunks the documents were split into.
    pub chunks: usize,
    /// Entity nodes written.
    pub nodes: usize,
    /// Relations written.
    pub relations: usize,
}

impl AddAssign for IndexStats {
    fn add_assign(&mut self, rhs: Self) {
        self.chunks += rhs.chunks;
        self.nodes += rhs.nodes;
        self.relations += rhs.relations;
    }
}

/// Index that writes extracted facts through a [`PropertyGraphStore`].
pub struct PropertyGraphIndex<S: PropertyGraphStore> {
    store: S,
    extractors: Vec<Box<dyn GraphExtractor>>,
    splitter: SentenceSplitter,
}

impl<S: PropertyGraphStore> PropertyGraphIndex<S> {
    /// Creates an empty index over `store`.
    #[must_use]
    pub fn new(store: S, extractors: Vec<Box<dyn GraphExtractor>>) -> Self {
        Self {
            store,
            extractors,
            splitter: SentenceSplitter::default(),
        }
    }

    /// Sets the splitter used for subsequent inserts.
    #[must_use]
    pub const fn with_splitter(mut self, splitter: SentenceSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Builds an index and inserts every document.
    ///
    /// Chunks with [`SentenceSplitter::default`]. For other chunk settings,
    /// chain [`Self::new`], [`Self::with_splitter`] and [`Self::insert_all`];
    /// [`crate::demo::build_index`] wires the `[extraction]` settings that way.
    ///
    /// # Errors
    ///
    /// Returns the first extraction or store error. Documents indexed before
    /// the failure stay written.
    pub fn from_documents(
        documents: impl IntoIterator<Item = Document>,
        store: S,
        extractors: Vec<Box<dyn GraphExtractor>>,
    ) -> Result<Self> {
        let index = Self::new(store, extractors);
        index.insert_all(documents)?;
        Ok(index)
    }

    /// Inserts several documents, returning the combined counts.
    ///
    /// # Errors
    ///
    /// Returns the first extraction or store error.
    pub fn insert_all(&self, documents: impl IntoIterator<Item = Document>) -> Result<IndexStats> {
        let mut total = IndexStats::default();
        for document in documents {
            total += self.insert(&document)?;
        }
        Ok(total)
    }

    /// Splits, extracts, and writes one document.
    ///
    /// # Errors
    ///
    /// Returns the first extraction or store error.
    #[instrument(skip_all, fields(document = %document.id))]
    pub fn insert(&self, document: &Document) -> Result<IndexStats> {
        let chunks = self.splitter.split(document);
        metrics::counter!("graph_index_chunks_total").increment(chunks.len() as u64);

        let mut extraction = Extraction::default();
        for chunk in &chunks {
            for extractor in &self.extractors {
                extraction.extend(extractor.extract(chunk)?);
            }
        }

        let nodes = dedup_nodes(extraction.nodes);
        self.store.upsert_nodes(&nodes)?;
        self.store.upsert_relations(&extraction.relations)?;

        let stats = IndexStats {
            chunks: chunks.len(),
            nodes: nodes.len(),
            relations: extraction.relations.len(),
        };
        tracing::info!(
            chunks = stats.chunks,
            nodes = stats.nodes,
            relations = stats.relations,
            "Indexed document"
        );
        Ok(stats)
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Builds a query engine that reads from this index's store.
    #[must_use]
    pub fn as_query_engine(
        &self,
        llm: Arc<dyn LlmProvider>,
        config: QueryConfig,
    ) -> QueryEngine<&S> {
        QueryEngine::new(&self.store, llm, config)
    }
}

/// Removes repeated `(name, label)` pairs, keeping first occurrences.
fn dedup_nodes(nodes: Vec<EntityNode>) -> Vec<EntityNode> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| seen.insert((node.name.clone(), node.label.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Relation, TextChunk, Triple};
    use crate::storage::{TripleBackend, TripleGraphStore};
    use std::sync::Mutex;

    /// Emits a fixed extraction for every chunk and records chunk texts.
    struct FixedExtractor {
        extraction: Extraction,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl GraphExtractor for FixedExtractor {
        fn extract(&self, chunk: &TextChunk) -> Result<Extraction> {
            self.seen.lock().unwrap().push(chunk.text.clone());
            Ok(self.extraction.clone())
        }
    }

    fn gate_extraction() -> Extraction {
        Extraction {
            nodes: vec![
                EntityNode::new("Kryon", "SPECIES"),
                EntityNode::new("Great Stellar Gate", "TECHNOLOGY"),
                EntityNode::new("Great Stellar Gate", "TECHNOLOGY"),
                EntityNode::new("Chronos-Steel", "MATERIAL"),
            ],
            relations: vec![
                Relation::new("Kryon", "BUILT", "Great Stellar Gate"),
                Relation::new("Great Stellar Gate", "MADE_OF", "Chronos-Steel"),
            ],
        }
    }

    #[test]
    fn test_from_documents_writes_through_store() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let extractor = FixedExtractor {
            extraction: gate_extraction(),
            seen: Arc::clone(&seen),
        };

        let index = PropertyGraphIndex::from_documents(
            vec![Document::new("The Kryons built the Great Stellar Gate.")],
            TripleGraphStore::in_memory("test"),
            vec![Box::new(extractor)],
        )
        .unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(
            index.store().get("Great Stellar Gate").unwrap(),
            vec![
                Triple::new("Great Stellar Gate", "is_a", "TECHNOLOGY"),
                Triple::new("Great Stellar Gate", "MADE_OF", "Chronos-Steel"),
            ]
        );
    }

    #[test]
    fn test_insert_dedups_nodes_within_batch() {
        let extractor = FixedExtractor {
            extraction: gate_extraction(),
            seen: Arc::new(Mutex::new(Vec::new())),
        };
        let index = PropertyGraphIndex::new(
            TripleGraphStore::in_memory("test"),
            vec![Box::new(extractor)],
        );

        let stats = index.insert(&Document::new("One sentence.")).unwrap();
        assert_eq!(
            stats,
            IndexStats {
                chunks: 1,
                nodes: 3,
                relations: 2,
            }
        );
        assert_eq!(index.store().backend().triple_count().unwrap(), 5);
    }

    #[test]
    fn test_second_insert_is_not_deduped() {
        let extractor = FixedExtractor {
            extraction: gate_extraction(),
            seen: Arc::new(Mutex::new(Vec::new())),
        };
        let index = PropertyGraphIndex::new(
            TripleGraphStore::in_memory("test"),
            vec![Box::new(extractor)],
        );

        let mut total = index.insert(&Document::new("First.")).unwrap();
        total += index.insert(&Document::new("Second.")).unwrap();

        assert_eq!(total.nodes, 6);
        assert_eq!(index.store().get("Kryon").unwrap().len(), 4);
    }

    #[test]
    fn test_every_extractor_sees_every_chunk() {
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_b = Arc::new(Mutex::new(Vec::new()));
        let index = PropertyGraphIndex::new(
            TripleGraphStore::in_memory("test"),
            vec![
                Box::new(FixedExtractor {
                    extraction: Extraction::default(),
                    seen: Arc::clone(&seen_a),
                }),
                Box::new(FixedExtractor {
                    extraction: Extraction::default(),
                    seen: Arc::clone(&seen_b),
                }),
            ],
        )
        .with_splitter(SentenceSplitter::new(2, 0).unwrap());

        let stats = index.insert(&Document::new("a b. c d. e f.")).unwrap();
        assert_eq!(stats.chunks, 3);
        assert_eq!(*seen_a.lock().unwrap(), vec!["a b.", "c d.", "e f."]);
        assert_eq!(seen_b.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_configured_splitter_applies_to_insert_all() {
        let lore = || vec![Document::new("The Kryons built it. It is made of Chronos-Steel.")];
        let extractor = |seen: &Arc<Mutex<Vec<String>>>| -> Vec<Box<dyn GraphExtractor>> {
            vec![Box::new(FixedExtractor {
                extraction: Extraction::default(),
                seen: Arc::clone(seen),
            })]
        };

        let default_seen = Arc::new(Mutex::new(Vec::new()));
        PropertyGraphIndex::from_documents(
            lore(),
            TripleGraphStore::in_memory("test"),
            extractor(&default_seen),
        )
        .unwrap();
        assert_eq!(default_seen.lock().unwrap().len(), 1);

        let small_seen = Arc::new(Mutex::new(Vec::new()));
        let index =
            PropertyGraphIndex::new(TripleGraphStore::in_memory("test"), extractor(&small_seen))
                .with_splitter(SentenceSplitter::new(4, 0).unwrap());
        let stats = index.insert_all(lore()).unwrap();
        assert_eq!(stats.chunks, 2);
        assert_eq!(
            *small_seen.lock().unwrap(),
            vec!["The Kryons built it.", "It is made of Chronos-Steel."]
        );
    }

    #[test]
    fn test_blank_document_writes_nothing() {
        let index = PropertyGraphIndex::new(
            TripleGraphStore::in_memory("test"),
            vec![Box::new(FixedExtractor {
                extraction: gate_extraction(),
                seen: Arc::new(Mutex::new(Vec::new())),
            })],
        );
        let stats = index.insert(&Document::new("   ")).unwrap();
        assert_eq!(stats, IndexStats::default());
        assert_eq!(index.store().backend().triple_count().unwrap(), 0);
    }
}
