//! Graph types for triple-store knowledge graphs.
//!
//! Everything stored in the graph is a [`Triple`]. Extraction produces two
//! higher-level shapes that the graph store adapter flattens into triples:
//!
//! | Shape | Stored as |
//! |-------|-----------|
//! | [`EntityNode`] | `(name, "is_a", label)` |
//! | [`Relation`] | `(source_id, label, target_id)` |
//!
//! # Example
//!
//! ```rust
//! use triplerag::models::{EntityNode, Relation, Triple};
//!
//! let planet = EntityNode::new("Zephyr-7", "PLANET");
//! assert_eq!(planet.to_triple(), Triple::new("Zephyr-7", "is_a", "PLANET"));
//!
//! let located = Relation::new("Zephyr-7", "LOCATED_IN", "Andromeda Sector");
//! assert_eq!(located.to_triple().as_array(), ["Zephyr-7", "LOCATED_IN", "Andromeda Sector"]);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Predicate used to record an entity's category.
pub const IS_A: &str = "is_a";

/// A named thing with a category label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityNode {
    /// Entity name, also its identifier in the graph.
    pub name: String,
    /// Category label (for example `PLANET`).
    pub label: String,
}

impl EntityNode {
    /// Creates a new entity node.
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    /// Returns the `(name, "is_a", label)` triple for this node.
    #[must_use]
    pub fn to_triple(&self) -> Triple {
        Triple::new(&self.name, IS_A, &self.label)
    }
}

/// A directed, labeled edge between two entity identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Subject entity identifier.
    pub source_id: String,
    /// Predicate.
    pub label: String,
    /// Object entity identifier.
    pub target_id: String,
}

impl Relation {
    /// Creates a new relation.
    #[must_use]
    pub fn new(
        source_id: impl Into<String>,
        label: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            label: label.into(),
            target_id: target_id.into(),
        }
    }

    /// Returns the `(source_id, label, target_id)` triple for this relation.
    #[must_use]
    pub fn to_triple(&self) -> Triple {
        Triple::new(&self.source_id, &self.label, &self.target_id)
    }
}

/// A `(subject, predicate, object)` fact.
///
/// Serializes as a three-element array, `["subject", "predicate", "object"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    /// Subject.
    pub subject: String,
    /// Predicate (edge label).
    pub predicate: String,
    /// Object (destination id).
    pub object: String,
}

impl Triple {
    /// Creates a new triple.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Borrows the triple as `[subject, predicate, object]`.
    #[must_use]
    pub fn as_array(&self) -> [&str; 3] {
        [&self.subject, &self.predicate, &self.object]
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} -> {}", self.subject, self.predicate, self.object)
    }
}

impl From<Triple> for [String; 3] {
    fn from(t: Triple) -> Self {
        [t.subject, t.predicate, t.object]
    }
}

impl From<[String; 3]> for Triple {
    fn from([subject, predicate, object]: [String; 3]) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl Serialize for Triple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Triple {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[String; 3]>::deserialize(deserializer).map(Self::from)
    }
}

/// A tagged row returned by a one-hop traversal of the triple store.
///
/// `edge` is the predicate that was followed and `id` the vertex reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRow {
    /// Edge label.
    pub edge: String,
    /// Destination vertex id.
    pub id: String,
}

impl EdgeRow {
    /// Creates a new edge row.
    #[must_use]
    pub fn new(edge: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            edge: edge.into(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_node_triple() {
        let node = EntityNode::new("Kryon", "SPECIES");
        assert_eq!(node.to_triple().as_array(), ["Kryon", "is_a", "SPECIES"]);
    }

    #[test]
    fn test_relation_triple_is_unchanged() {
        let rel = Relation::new("Kryons", "BUILT", "Great Stellar Gate");
        let triple = rel.to_triple();
        assert_eq!(triple.subject, "Kryons");
        assert_eq!(triple.predicate, "BUILT");
        assert_eq!(triple.object, "Great Stellar Gate");
    }

    #[test]
    fn test_triple_serializes_as_array() {
        let triple = Triple::new("Chronos-Steel", "is_a", "MATERIAL");
        let json = serde_json::to_string(&triple).unwrap();
        assert_eq!(json, r#"["Chronos-Steel","is_a","MATERIAL"]"#);

        let back: Triple = serde_json::from_str(&json).unwrap();
        assert_eq!(back, triple);
    }

    #[test]
    fn test_triple_display() {
        let triple = Triple::new("Great Stellar Gate", "MADE_OF", "Chronos-Steel");
        assert_eq!(
            triple.to_string(),
            "Great Stellar Gate -> MADE_OF -> Chronos-Steel"
        );
    }

    #[test]
    fn test_triple_array_conversion() {
        let arr: [String; 3] = Triple::new("a", "b", "c").into();
        assert_eq!(arr, ["a".to_string(), "b".to_string(), "c".to_string()]);
    }
}
