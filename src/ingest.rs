//! Knowledge ingestion: fetch → chunk → embed → store.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::config::KnowledgeConfig;
use crate::document::Document;
use crate::embedding::{l2_normalize, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::source::DocumentSource;
use crate::store::KnowledgeStore;

/// The outcome of ingesting one topic.
///
/// Duplicate topics and unfetchable topics are expected conditions, so both
/// are modeled here rather than as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The topic was fetched, chunked, embedded, and stored.
    Stored {
        /// Number of chunks persisted for the topic.
        chunk_count: usize,
    },
    /// The topic already exists in the store; nothing was mutated.
    DuplicateTopic,
    /// The document source produced no text, even after the search fallback.
    FetchFailed,
}

/// Orchestrates ingestion of new topics into a [`KnowledgeStore`].
///
/// Fetching applies a two-step fallback: direct lookup by topic label first,
/// then a text search with the top hit fetched instead. If both steps fail
/// the outcome is [`IngestOutcome::FetchFailed`] — a soft failure, not an
/// error. Construct via [`KnowledgeIngestionPipeline::builder()`].
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{KnowledgeIngestionPipeline, KnowledgeConfig};
///
/// let pipeline = KnowledgeIngestionPipeline::builder()
///     .config(KnowledgeConfig::default())
///     .source(source)
///     .embedder(embedder)
///     .store(store)
///     .build()?;
///
/// match pipeline.ingest("Alan Turing").await? {
///     IngestOutcome::Stored { chunk_count } => println!("stored {chunk_count} chunks"),
///     IngestOutcome::DuplicateTopic => println!("already present"),
///     IngestOutcome::FetchFailed => println!("nothing found"),
/// }
/// ```
pub struct KnowledgeIngestionPipeline {
    config: KnowledgeConfig,
    source: Arc<dyn DocumentSource>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn KnowledgeStore>,
    chunker: Arc<dyn Chunker>,
}

impl KnowledgeIngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    /// Ingest one topic: fetch (with search fallback) → chunk → embed → store.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyQuery`] for a blank topic and
    /// [`RagError::Pipeline`] if embedding or storage fails. Fetch failures
    /// and duplicate topics are reported through [`IngestOutcome`], not as
    /// errors.
    pub async fn ingest(&self, topic: &str) -> Result<IngestOutcome> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let Some(text) = self.fetch_with_fallback(topic).await else {
            warn!(topic, "fetch failed after search fallback");
            return Ok(IngestOutcome::FetchFailed);
        };

        let mut chunks = self.chunker.chunk(&Document::new(topic, text));
        if chunks.is_empty() {
            warn!(topic, "source returned no usable text");
            return Ok(IngestOutcome::FetchFailed);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(topic, error = %e, "embedding failed during ingestion");
            RagError::Pipeline(format!("embedding failed for topic '{topic}': {e}"))
        })?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::Pipeline(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        for (chunk, mut embedding) in chunks.iter_mut().zip(embeddings) {
            l2_normalize(&mut embedding);
            chunk.embedding = embedding;
        }

        let chunk_count = chunks.len();
        let stored = self.store.insert_topic(topic, chunks).await.map_err(|e| {
            error!(topic, error = %e, "store insert failed during ingestion");
            RagError::Pipeline(format!("insert failed for topic '{topic}': {e}"))
        })?;

        if stored {
            info!(topic, chunk_count, "topic ingested");
            Ok(IngestOutcome::Stored { chunk_count })
        } else {
            info!(topic, "topic already present");
            Ok(IngestOutcome::DuplicateTopic)
        }
    }

    /// Resolve a topic to text: direct fetch first, then search and fetch
    /// the top hit. Source errors are treated the same as a miss.
    async fn fetch_with_fallback(&self, topic: &str) -> Option<String> {
        match self.source.fetch(topic).await {
            Ok(Some(text)) => return Some(text),
            Ok(None) => {}
            Err(e) => warn!(topic, error = %e, "direct fetch failed, trying search"),
        }

        let titles = match self.source.search(topic).await {
            Ok(titles) => titles,
            Err(e) => {
                warn!(topic, error = %e, "search fallback failed");
                return None;
            }
        };
        let title = titles.first()?;

        match self.source.fetch(title).await {
            Ok(text) => text,
            Err(e) => {
                warn!(topic, title = %title, error = %e, "fallback fetch failed");
                None
            }
        }
    }
}

/// Builder for constructing a [`KnowledgeIngestionPipeline`].
///
/// `source`, `embedder`, and `store` are required; `config` defaults to
/// [`KnowledgeConfig::default()`] and `chunker` to a [`FixedSizeChunker`]
/// sized from the config.
///
/// [`FixedSizeChunker`]: crate::chunking::FixedSizeChunker
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<KnowledgeConfig>,
    source: Option<Arc<dyn DocumentSource>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn KnowledgeStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: KnowledgeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document source.
    pub fn source(mut self, source: Arc<dyn DocumentSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the knowledge store.
    pub fn store(mut self, store: Arc<dyn KnowledgeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the default fixed-size chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`KnowledgeIngestionPipeline`], validating that all required
    /// collaborators are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<KnowledgeIngestionPipeline> {
        let config = self.config.unwrap_or_default();
        let source =
            self.source.ok_or_else(|| RagError::Config("source is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;
        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(crate::chunking::FixedSizeChunker::new(config.chunk_size)));

        Ok(KnowledgeIngestionPipeline { config, source, embedder, store, chunker })
    }
}
