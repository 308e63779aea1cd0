//! Source documents and the chunks they are split into.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// Identifier for a source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a document ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives a stable ID from document text (`doc_` + 16 hex chars of SHA-256).
    #[must_use]
    pub fn from_content(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        Self(format!("doc_{}", &hex::encode(digest)[..16]))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A piece of source text to index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub id: DocumentId,
    /// Full text.
    pub text: String,
    /// Free-form metadata (file name, origin, ...).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Creates a document whose ID is derived from its text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: DocumentId::from_content(&text),
            text,
            metadata: HashMap::new(),
        }
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A contiguous slice of a document handed to extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Parent document.
    pub document_id: DocumentId,
    /// Position of the chunk within its document (0-based).
    pub ordinal: usize,
    /// Chunk text.
    pub text: String,
}

impl TextChunk {
    /// Creates a new chunk.
    #[must_use]
    pub fn new(document_id: DocumentId, ordinal: usize, text: impl Into<String>) -> Self {
        Self {
            document_id,
            ordinal,
            text: text.into(),
        }
    }
}
