//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`], which
//! splits text into contiguous character windows. There is deliberately no
//! word or sentence boundary awareness; what matters for the knowledge store
//! is that concatenating a topic's chunks in index order reproduces the
//! source text exactly.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text but no embeddings; embeddings
/// are attached later by the ingestion pipeline. Any replacement strategy must
/// preserve the lossless-concatenation invariant.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into contiguous, non-overlapping windows of `chunk_size`
/// characters; the final window holds the remainder and may be shorter.
///
/// Windows are measured in `char`s, never bytes, so multibyte text cannot be
/// split mid-code-point. Chunk IDs are generated as `{topic}_{index}`.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{Document, FixedSizeChunker, Chunker};
///
/// let chunker = FixedSizeChunker::new(500);
/// let chunks = chunker.chunk(&Document::new("Alan Turing", text));
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker` with the given window size in characters.
    ///
    /// A `chunk_size` of zero is clamped to one.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size: chunk_size.max(1) }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        split_chars(&document.text, self.chunk_size)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                id: format!("{}_{i}", document.topic),
                text,
                embedding: Vec::new(),
                topic: document.topic.clone(),
            })
            .collect()
    }
}

/// Split `text` into windows of `size` characters, final window shorter.
///
/// Concatenating the returned windows in order reproduces `text` exactly.
fn split_chars(text: &str, size: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == size {
            windows.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        windows.push(current);
    }

    windows
}
