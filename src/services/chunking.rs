//! Sentence-aware text chunking.
//!
//! Documents are cut into sentences, then sentences are packed into chunks
//! bounded by a word budget. Consecutive chunks share a tail of whole
//! sentences so facts spanning a boundary are seen by the extractor twice.

use crate::models::{Document, TextChunk};
use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// A sentence: text up to a terminator run, or up to a newline or the end.
static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?\n]*[.!?]+|[^.!?\n]+").unwrap_or_else(|_| unreachable!()));

/// Splits documents into overlapping, sentence-aligned chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SentenceSplitter {
    /// Default chunk size in words.
    pub const DEFAULT_CHUNK_SIZE: usize = 1024;

    /// Default overlap in words.
    pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

    /// Creates a splitter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `chunk_size` is zero or the overlap
    /// is not smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidInput("chunk_size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::InvalidInput(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Returns the chunk size in words.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the overlap in words.
    #[must_use]
    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits a document into chunks. Blank documents yield no chunks.
    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<TextChunk> {
        self.split_text(&document.text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| TextChunk::new(document.id.clone(), ordinal, text))
            .collect()
    }

    /// Splits raw text into chunk strings.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<(&str, usize)> = Vec::new();
        let mut current_words = 0;

        for sentence in sentences(text) {
            let words = word_count(sentence);
            if current_words + words > self.chunk_size && !current.is_empty() {
                chunks.push(join(&current));
                let (kept, kept_words) = self.overlap_tail(&current);
                current = kept;
                current_words = kept_words;
                // Overlap never blocks progress.
                if current_words + words > self.chunk_size {
                    current.clear();
                    current_words = 0;
                }
            }
            current.push((sentence, words));
            current_words += words;
        }

        if !current.is_empty() {
            chunks.push(join(&current));
        }
        chunks
    }

    /// Trailing whole sentences of `current` that fit in the overlap budget.
    fn overlap_tail<'a>(&self, current: &[(&'a str, usize)]) -> (Vec<(&'a str, usize)>, usize) {
        let mut kept_words = 0;
        let mut start = current.len();
        for (idx, (_, words)) in current.iter().enumerate().rev() {
            if kept_words + words > self.chunk_overlap {
                break;
            }
            kept_words += words;
            start = idx;
        }
        (current[start..].to_vec(), kept_words)
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            chunk_overlap: Self::DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Returns the trimmed, non-empty sentences of `text`.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn join(sentences: &[(&str, usize)]) -> String {
    sentences
        .iter()
        .map(|(s, _)| *s)
        .collect::<Vec<_>>()
        .join(" ")
}
