//! Schema-constrained knowledge-graph extraction.
//!
//! An extractor turns one [`TextChunk`] into entity nodes and relations. The
//! LLM-backed [`SchemaExtractor`] asks for `(subject, relation, object)`
//! triplets restricted to a fixed vocabulary and keeps only those that fit.
//!
//! # Example
//!
//! ```rust,ignore
//! use triplerag::models::ExtractionSchema;
//! use triplerag::services::{GraphExtractor, SchemaExtractor};
//!
//! let schema = ExtractionSchema::new(["PLANET", "SECTOR"], ["LOCATED_IN"]);
//! let extractor = SchemaExtractor::new(llm, schema);
//! let extraction = extractor.extract(&chunk)?;
//! println!("{} relations", extraction.relations.len());
//! ```

use crate::Result;
use crate::llm::{LlmProvider, extract_json_from_response};
use crate::models::{EntityNode, ExtractionSchema, Relation, TextChunk};
use serde::Deserialize;
use std::sync::Arc;

/// System prompt for triplet extraction.
const EXTRACTION_SYSTEM_PROMPT: &str = "You extract knowledge-graph triplets from text. \
    Respond with valid JSON only, no other text.";

/// Entities and relations pulled from one chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Entity nodes, two per kept triplet, in triplet order.
    pub nodes: Vec<EntityNode>,
    /// Relations, one per kept triplet.
    pub relations: Vec<Relation>,
}

impl Extraction {
    /// Returns true if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relations.is_empty()
    }

    /// Appends another extraction to this one.
    pub fn extend(&mut self, other: Self) {
        self.nodes.extend(other.nodes);
        self.relations.extend(other.relations);
    }
}

/// Turns text chunks into graph facts.
pub trait GraphExtractor: Send + Sync {
    /// Extracts nodes and relations from a chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying model cannot be reached.
    fn extract(&self, chunk: &TextChunk) -> Result<Extraction>;
}

/// LLM extractor constrained to an [`ExtractionSchema`].
pub struct SchemaExtractor {
    llm: Arc<dyn LlmProvider>,
    schema: ExtractionSchema,
    max_triplets_per_chunk: usize,
}

impl SchemaExtractor {
    /// Default upper bound on triplets kept per chunk.
    pub const DEFAULT_MAX_TRIPLETS_PER_CHUNK: usize = 10;

    /// Creates an extractor over a shared LLM provider.
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>, schema: ExtractionSchema) -> Self {
        Self {
            llm,
            schema,
            max_triplets_per_chunk: Self::DEFAULT_MAX_TRIPLETS_PER_CHUNK,
        }
    }

    /// Sets the maximum number of triplets kept per chunk.
    #[must_use]
    pub const fn with_max_triplets_per_chunk(mut self, max: usize) -> Self {
        self.max_triplets_per_chunk = max;
        self
    }

    /// Returns the schema.
    #[must_use]
    pub const fn schema(&self) -> &ExtractionSchema {
        &self.schema
    }

    /// Builds the user prompt for one chunk.
    fn build_prompt(&self, text: &str) -> String {
        let entities = self.schema.possible_entities.join(", ");
        let relations = self.schema.possible_relations.join(", ");
        let max = self.max_triplets_per_chunk;
        format!(
            r#"Extract up to {max} knowledge triplets from the text below.

Allowed entity types: [{entities}]
Allowed relation types: [{relations}]

Rules:
- Use only the allowed entity and relation types.
- Use the entity name exactly as it appears in the text.
- The subject is the entity the relation starts from.

Respond in JSON format:
{{"triplets": [{{"subject": {{"name": "...", "type": "..."}}, "relation": "...", "object": {{"name": "...", "type": "..."}}}}]}}

Text:
{text}"#
        )
    }

    /// Converts raw triplets into an [`Extraction`], applying the schema.
    fn apply_schema(&self, triplets: Vec<RawTriplet>) -> Extraction {
        let mut extraction = Extraction::default();

        for triplet in triplets {
            if extraction.relations.len() >= self.max_triplets_per_chunk {
                break;
            }

            let subject = triplet.subject.name.trim();
            let object = triplet.object.name.trim();
            if subject.is_empty() || object.is_empty() {
                tracing::debug!("Dropping triplet with blank entity name");
                continue;
            }

            let resolved = (
                self.schema.resolve_entity(&triplet.subject.kind),
                self.schema.resolve_relation(&triplet.relation),
                self.schema.resolve_entity(&triplet.object.kind),
            );
            let (Some(subject_label), Some(relation), Some(object_label)) = resolved else {
                tracing::debug!(
                    subject,
                    relation = %triplet.relation,
                    object,
                    "Dropping triplet outside schema"
                );
                continue;
            };

            extraction.nodes.push(EntityNode::new(subject, subject_label));
            extraction.nodes.push(EntityNode::new(object, object_label));
            extraction
                .relations
                .push(Relation::new(subject, relation, object));
        }

        extraction
    }
}

impl GraphExtractor for SchemaExtractor {
    fn extract(&self, chunk: &TextChunk) -> Result<Extraction> {
        if chunk.text.trim().is_empty() {
            return Ok(Extraction::default());
        }

        let prompt = self.build_prompt(&chunk.text);
        let response = self
            .llm
            .complete_with_system(EXTRACTION_SYSTEM_PROMPT, &prompt)?;

        let Some(triplets) = parse_triplets(&response) else {
            tracing::warn!(
                document = %chunk.document_id,
                chunk = chunk.ordinal,
                "Could not parse extraction response; chunk yields no triplets"
            );
            return Ok(Extraction::default());
        };

        let extraction = self.apply_schema(triplets);
        tracing::debug!(
            document = %chunk.document_id,
            chunk = chunk.ordinal,
            relations = extraction.relations.len(),
            "Extracted triplets"
        );
        Ok(extraction)
    }
}

/// Triplet as returned by the model.
#[derive(Debug, Deserialize)]
struct RawTriplet {
    subject: RawEntity,
    #[serde(alias = "predicate")]
    relation: String,
    object: RawEntity,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    name: String,
    #[serde(rename = "type", alias = "label", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct TripletsEnvelope {
    triplets: Vec<RawTriplet>,
}

/// Locates and parses the triplet list; accepts the envelope or a bare array.
fn parse_triplets(response: &str) -> Option<Vec<RawTriplet>> {
    let json = extract_json_from_response(response);
    serde_json::from_str::<TripletsEnvelope>(json)
        .map(|envelope| envelope.triplets)
        .or_else(|_| serde_json::from_str::<Vec<RawTriplet>>(json))
        .ok()
}
