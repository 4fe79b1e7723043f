//! Data types for documents, chunks, search results, and paper records.

use serde::{Deserialize, Serialize};

/// A source document fetched for a topic.
///
/// Ephemeral: only the derived [`Chunk`]s are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The topic label this document was fetched for.
    pub topic: String,
    /// The full text content.
    pub text: String,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document for a topic with no source URI.
    pub fn new(topic: impl Into<String>, text: impl Into<String>) -> Self {
        Self { topic: topic.into(), text: text.into(), source_uri: None }
    }
}

/// A segment of a [`Document`] with its vector embedding.
///
/// Chunk IDs take the form `{topic}_{index}` with a zero-based index, unique
/// within a topic and stable for the lifetime of that topic's entry.
/// Concatenating a topic's chunks in index order reproduces the source text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{topic}_{index}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The L2-normalized embedding for this chunk's text. Empty until the
    /// pipeline attaches one.
    pub embedding: Vec<f32>,
    /// The topic this chunk belongs to.
    pub topic: String,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// A static academic-paper row in the research-search corpus.
///
/// Loaded once at startup and immutable thereafter. Row `i` of the metadata
/// table corresponds to row `i` of the embedding cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperRecord {
    /// Paper title.
    pub title: String,
    /// Paper abstract.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Comma-separated author list, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
}

impl PaperRecord {
    /// The concatenated text field used for lexical indexing.
    pub fn indexed_text(&self) -> String {
        format!("{}. {}", self.title, self.abstract_text)
    }
}

/// A ranked paper returned by the hybrid search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperHit {
    /// Paper title.
    pub title: String,
    /// Comma-separated author list, if known.
    pub authors: Option<String>,
    /// Paper abstract.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// The combined lexical+semantic relevance score. Cosine similarities are
    /// blended linearly, so the score is not confined to `[0, 1]`.
    pub score: f32,
}
