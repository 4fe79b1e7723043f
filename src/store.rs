//! Topic-keyed storage for embedded chunks with similarity search.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::embedding::dot;
use crate::error::{RagError, Result};

/// A storage backend for embedded chunks, keyed by topic.
///
/// A topic, once successfully inserted, can never be inserted again for the
/// lifetime of the store (at-most-once-per-topic). Implementations must make
/// the existence check and the insert atomic: concurrent inserts of the same
/// topic must not both succeed.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{InMemoryKnowledgeStore, KnowledgeStore};
///
/// let store = InMemoryKnowledgeStore::new();
/// let stored = store.insert_topic("Alan Turing", chunks).await?;
/// let results = store.search(&query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// `true` iff any persisted chunk carries this topic.
    async fn exists(&self, topic: &str) -> bool;

    /// Insert a topic's chunks. Returns `false` without mutating anything if
    /// the topic already exists; a duplicate is an expected user action, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Store`] if `chunks` is empty or any chunk is
    /// missing its embedding.
    async fn insert_topic(&self, topic: &str, chunks: Vec<Chunk>) -> Result<bool>;

    /// Remove a topic and all of its chunks. Returns `false` if the topic
    /// was not present.
    async fn delete_topic(&self, topic: &str) -> Result<bool>;

    /// The `top_k` chunks most similar to `embedding`, in descending score
    /// order with ties broken by insertion order. An empty store yields an
    /// empty `Vec`, never an error.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Topic labels currently present, in insertion order.
    async fn topics(&self) -> Vec<String>;

    /// Total number of stored chunks.
    async fn chunk_count(&self) -> usize;
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Chunks in insertion order; search tie-breaking depends on this.
    records: Vec<Chunk>,
    /// Explicit secondary index: topic → chunk ids, maintained on insert so
    /// existence checks never scan the records.
    topics: HashMap<String, Vec<String>>,
    /// Topics in insertion order.
    topic_order: Vec<String>,
}

/// An in-memory [`KnowledgeStore`] using cosine similarity for search.
///
/// State lives behind a single `tokio::sync::RwLock`; `insert_topic` holds
/// the write guard across the existence check and the insert, which closes
/// the check-then-act race for concurrent ingestion of one topic. Reads may
/// proceed concurrently with unrelated writes.
///
/// Stored embeddings are assumed L2-normalized (the [`EmbeddingProvider`]
/// contract), so similarity is a plain dot product.
///
/// [`EmbeddingProvider`]: crate::embedding::EmbeddingProvider
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryKnowledgeStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn exists(&self, topic: &str) -> bool {
        self.inner.read().await.topics.contains_key(topic)
    }

    async fn insert_topic(&self, topic: &str, chunks: Vec<Chunk>) -> Result<bool> {
        if chunks.is_empty() {
            return Err(RagError::Store(format!("no chunks to insert for topic '{topic}'")));
        }
        if let Some(chunk) = chunks.iter().find(|c| c.embedding.is_empty()) {
            return Err(RagError::Store(format!("chunk '{}' has no embedding", chunk.id)));
        }

        let mut inner = self.inner.write().await;
        if inner.topics.contains_key(topic) {
            debug!(topic, "topic already present, insert skipped");
            return Ok(false);
        }

        let ids: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
        let chunk_count = chunks.len();
        inner.records.extend(chunks);
        inner.topics.insert(topic.to_string(), ids);
        inner.topic_order.push(topic.to_string());

        info!(topic, chunk_count, "topic inserted");
        Ok(true)
    }

    async fn delete_topic(&self, topic: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.topics.remove(topic).is_none() {
            return Ok(false);
        }
        inner.records.retain(|c| c.topic != topic);
        inner.topic_order.retain(|t| t != topic);
        info!(topic, "topic deleted");
        Ok(true)
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let inner = self.inner.read().await;

        let mut scored: Vec<SearchResult> = inner
            .records
            .iter()
            .map(|chunk| SearchResult {
                chunk: chunk.clone(),
                score: dot(&chunk.embedding, embedding),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn topics(&self) -> Vec<String> {
        self.inner.read().await.topic_order.clone()
    }

    async fn chunk_count(&self) -> usize {
        self.inner.read().await.records.len()
    }
}
