//! Question answering over the property graph.
//!
//! ```text
//! question ──▶ LLM keywords ("a^b^c")
//!     │
//!     ▼
//! candidates: question, each keyword, Title Case variants
//!     │
//!     ▼
//! store.get(candidate), following objects for `path_depth` hops
//!     │
//!     ▼
//! "s -> p -> o" context ──▶ LLM answer
//! ```

use crate::config::RetrievalConfig;
use crate::llm::LlmProvider;
use crate::models::Triple;
use crate::storage::PropertyGraphStore;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Answer returned when retrieval finds nothing.
pub const EMPTY_RESPONSE: &str = "Empty Response";

const KEYWORD_PROMPT: &str = "Given some initial query, generate synonyms or related keywords \
up to {max_keywords} in total, considering possible cases of capitalization, pluralization, \
common expressions, etc.
Provide all synonyms/keywords separated by '^' symbols: 'keyword1^keyword2^...'
Note, result should be in one-line, separated by '^' symbols.
----
QUERY: {query_str}
----
KEYWORDS: ";

const TEXT_QA_PROMPT: &str = "Context information is below.
---------------------
{context_str}
---------------------
Given the context information and not prior knowledge, answer the query.
Query: {query_str}
Answer: ";

/// Retrieval settings for a query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Keywords requested from the LLM.
    pub max_keywords: usize,
    /// Hops followed from each matched subject (at least one).
    pub path_depth: usize,
    /// Maximum triples handed to synthesis.
    pub limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        RetrievalConfig::default().into()
    }
}

impl From<RetrievalConfig> for QueryConfig {
    fn from(config: RetrievalConfig) -> Self {
        Self {
            max_keywords: config.max_keywords,
            path_depth: config.path_depth,
            limit: config.limit,
        }
    }
}

impl QueryConfig {
    /// Sets the keyword budget.
    #[must_use]
    pub const fn with_max_keywords(mut self, max: usize) -> Self {
        self.max_keywords = max;
        self
    }

    /// Sets the traversal depth.
    #[must_use]
    pub const fn with_path_depth(mut self, depth: usize) -> Self {
        self.path_depth = depth;
        self
    }

    /// Sets the triple limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Keyword-expanding retriever over a [`PropertyGraphStore`].
pub struct SynonymRetriever<S: PropertyGraphStore> {
    store: S,
    llm: Arc<dyn LlmProvider>,
    config: QueryConfig,
}

impl<S: PropertyGraphStore> SynonymRetriever<S> {
    /// Creates a retriever.
    #[must_use]
    pub fn new(store: S, llm: Arc<dyn LlmProvider>, config: QueryConfig) -> Self {
        Self { store, llm, config }
    }

    /// Asks the LLM for keywords related to `question`.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM call fails.
    pub fn keywords(&self, question: &str) -> Result<Vec<String>> {
        let prompt = KEYWORD_PROMPT
            .replace("{max_keywords}", &self.config.max_keywords.to_string())
            .replace("{query_str}", question);
        let response = self.llm.complete(&prompt)?;
        Ok(parse_keywords(&response, self.config.max_keywords))
    }

    /// Retrieves triples relevant to `question`.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM or the store fails.
    #[instrument(skip(self))]
    pub fn retrieve(&self, question: &str) -> Result<Vec<Triple>> {
        let keywords = self.keywords(question)?;
        let mut frontier = candidates(question, &keywords);
        tracing::debug!(?frontier, "Retrieval candidates");

        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut triples = Vec::new();

        for _ in 0..self.config.path_depth.max(1) {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for subject in frontier {
                if !visited.insert(subject.clone()) {
                    continue;
                }
                for triple in self.store.get(&subject)? {
                    if triples.len() >= self.config.limit {
                        return Ok(triples);
                    }
                    if seen.insert(triple.clone()) {
                        next.push(triple.object.clone());
                        triples.push(triple);
                    }
                }
            }
            frontier = next;
        }

        Ok(triples)
    }
}

/// Splits a `^`-separated keyword line.
fn parse_keywords(response: &str, max: usize) -> Vec<String> {
    let line = response.trim();
    let line = line.strip_prefix("KEYWORDS:").unwrap_or(line);
    line.split('^')
        .map(|kw| kw.trim().trim_matches(['\'', '"', '`']).trim())
        .filter(|kw| !kw.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Orders lookup candidates: the question, then each keyword and its
/// title-cased variant, without repeats.
fn candidates(question: &str, keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(question.trim().to_string())
        .chain(
            keywords
                .iter()
                .flat_map(|kw| [kw.clone(), title_case(kw)]),
        )
        .filter(|c| !c.is_empty() && seen.insert(c.clone()))
        .collect()
}

/// Upper-cases the first letter of every word, including after hyphens.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace() || c == '-';
    }
    out
}

/// Turns retrieved triples into an answer.
pub struct ResponseSynthesizer {
    llm: Arc<dyn LlmProvider>,
}

impl ResponseSynthesizer {
    /// Creates a synthesizer.
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Answers `question` from `triples`.
    ///
    /// Returns [`EMPTY_RESPONSE`] without calling the LLM when there are no
    /// triples.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM call fails.
    pub fn synthesize(&self, question: &str, triples: &[Triple]) -> Result<String> {
        if triples.is_empty() {
            return Ok(EMPTY_RESPONSE.to_string());
        }

        let context = triples
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = TEXT_QA_PROMPT
            .replace("{context_str}", &context)
            .replace("{query_str}", question);

        Ok(self.llm.complete(&prompt)?.trim().to_string())
    }
}

/// Result of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    /// Natural-language answer.
    pub answer: String,
    /// Triples the answer was synthesized from.
    pub source_triples: Vec<Triple>,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.answer)
    }
}

/// Retrieve-then-synthesize query engine.
pub struct QueryEngine<S: PropertyGraphStore> {
    retriever: SynonymRetriever<S>,
    synthesizer: ResponseSynthesizer,
}

impl<S: PropertyGraphStore> QueryEngine<S> {
    /// Creates a query engine.
    #[must_use]
    pub fn new(store: S, llm: Arc<dyn LlmProvider>, config: QueryConfig) -> Self {
        Self {
            retriever: SynonymRetriever::new(store, Arc::clone(&llm), config),
            synthesizer: ResponseSynthesizer::new(llm),
        }
    }

    /// Answers a natural-language question.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank question, or the first
    /// LLM or store error.
    #[instrument(skip(self))]
    pub fn query(&self, question: &str) -> Result<Response> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }

        let source_triples = self.retriever.retrieve(question)?;
        tracing::info!(triples = source_triples.len(), "Retrieved context");
        let answer = self.synthesizer.synthesize(question, &source_triples)?;

        Ok(Response {
            answer,
            source_triples,
        })
    }
}
