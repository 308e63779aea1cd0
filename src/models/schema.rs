//! Extraction vocabulary.

use serde::{Deserialize, Serialize};

/// The entity and relation labels an extractor is allowed to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSchema {
    /// Allowed entity labels (for example `PLANET`, `SPECIES`).
    pub possible_entities: Vec<String>,
    /// Allowed relation labels (for example `LOCATED_IN`).
    pub possible_relations: Vec<String>,
    /// Drop triplets whose labels are outside the vocabulary.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

const fn default_strict() -> bool {
    true
}

impl ExtractionSchema {
    /// Creates a strict schema from entity and relation vocabularies.
    #[must_use]
    pub fn new<E, R>(entities: E, relations: R) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            possible_entities: entities.into_iter().map(Into::into).collect(),
            possible_relations: relations.into_iter().map(Into::into).collect(),
            strict: true,
        }
    }

    /// Sets strict mode.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Resolves an entity label against the vocabulary.
    ///
    /// Returns the vocabulary spelling on a match. Outside strict mode an
    /// unknown label is normalized and accepted; in strict mode it is `None`.
    #[must_use]
    pub fn resolve_entity(&self, label: &str) -> Option<String> {
        resolve(&self.possible_entities, label, self.strict)
    }

    /// Resolves a relation label against the vocabulary.
    #[must_use]
    pub fn resolve_relation(&self, label: &str) -> Option<String> {
        resolve(&self.possible_relations, label, self.strict)
    }
}

fn resolve(vocabulary: &[String], label: &str, strict: bool) -> Option<String> {
    let wanted = normalize_label(label);
    if wanted.is_empty() {
        return None;
    }
    vocabulary
        .iter()
        .find(|v| normalize_label(v) == wanted)
        .cloned()
        .or_else(|| (!strict).then_some(wanted))
}

/// Upper-snake-cases a label: `"made of"` and `"Made-Of"` both become `MADE_OF`.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}
