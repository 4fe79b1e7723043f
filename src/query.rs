//! Query answering: retrieve → grounded prompt → degrade-gracefully fallback.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::KnowledgeConfig;
use crate::embedding::{l2_normalize, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::store::KnowledgeStore;
use crate::synthesis::AnswerSynthesizer;

/// Build the context-constrained prompt for grounded answering.
///
/// The prompt instructs the model to answer strictly from the retrieved
/// chunks and to say so when the context does not help, which is what the
/// not-found phrase heuristic keys on. It always contains a `Context:` block
/// and ends with `Question: {query}`.
pub fn grounded_prompt(query: &str, chunks: &[String]) -> String {
    format!(
        "You are a helpful assistant. Answer the question strictly using the context below.\n\
         If the context does not help, say that the information is not found in the context.\n\
         \n\
         Context:\n\
         {}\n\
         \n\
         Question: {query}",
        chunks.join("\n")
    )
}

/// Orchestrates query answering against a [`KnowledgeStore`].
///
/// Answering is a two-tier degrade-gracefully policy: a grounded answer from
/// retrieved context is preferred; if retrieval comes back empty or the
/// grounded answer trips the configured not-found phrases, the pipeline
/// re-issues the raw query unconstrained. Synthesis failures are caught and
/// replaced with the configured apology message, so the end user never sees
/// a hard failure. Construct via [`QueryPipeline::builder()`].
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{QueryPipeline, KnowledgeConfig};
///
/// let pipeline = QueryPipeline::builder()
///     .config(KnowledgeConfig::default())
///     .embedder(embedder)
///     .store(store)
///     .synthesizer(synthesizer)
///     .build()?;
///
/// let answer = pipeline.answer("Who is Alan Turing?").await?;
/// ```
pub struct QueryPipeline {
    config: KnowledgeConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn KnowledgeStore>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
}

impl QueryPipeline {
    /// Create a new [`QueryPipelineBuilder`].
    pub fn builder() -> QueryPipelineBuilder {
        QueryPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    /// Retrieve up to `k` relevant chunk texts for `query`, best first.
    ///
    /// An empty store yields an empty `Vec`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyQuery`] for a blank query and
    /// [`RagError::Pipeline`] if query embedding or the store search fails.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let mut embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            RagError::Pipeline(format!("query embedding failed: {e}"))
        })?;
        l2_normalize(&mut embedding);

        let results = self.store.search(&embedding, k).await.map_err(|e| {
            error!(error = %e, "store search failed");
            RagError::Pipeline(format!("search failed: {e}"))
        })?;

        Ok(results.into_iter().map(|r| r.chunk.text).collect())
    }

    /// Answer `query`, preferring a grounded answer from retrieved context.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyQuery`] for a blank query and
    /// [`RagError::Pipeline`] if retrieval fails. Synthesis failures do not
    /// error; they yield the configured apology message.
    pub async fn answer(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let chunks = self.retrieve(query, self.config.top_k).await?;
        if chunks.is_empty() {
            info!("no relevant chunks, answering ungrounded");
            return Ok(self.complete_or_apologize(query).await);
        }

        let prompt = grounded_prompt(query, &chunks);
        let grounded = self.complete_or_apologize(&prompt).await;

        if self.is_not_found(&grounded) {
            info!("grounded answer missed, falling back to ungrounded");
            return Ok(self.complete_or_apologize(query).await);
        }

        info!(chunk_count = chunks.len(), "grounded answer produced");
        Ok(grounded)
    }

    /// `true` if `answer` trips any configured not-found phrase.
    ///
    /// Case-insensitive substring matching over model output. Best-effort
    /// heuristic, not a semantic guarantee.
    fn is_not_found(&self, answer: &str) -> bool {
        let lowered = answer.to_lowercase();
        self.config.not_found_phrases.iter().any(|phrase| lowered.contains(&phrase.to_lowercase()))
    }

    /// Complete `prompt`, substituting the apology message on failure.
    async fn complete_or_apologize(&self, prompt: &str) -> String {
        match self.synthesizer.complete(prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "synthesis failed, substituting apology");
                self.config.apology_message.clone()
            }
        }
    }
}

/// Builder for constructing a [`QueryPipeline`].
///
/// `embedder`, `store`, and `synthesizer` are required; `config` defaults to
/// [`KnowledgeConfig::default()`].
#[derive(Default)]
pub struct QueryPipelineBuilder {
    config: Option<KnowledgeConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn KnowledgeStore>>,
    synthesizer: Option<Arc<dyn AnswerSynthesizer>>,
}

impl QueryPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: KnowledgeConfig) -> Self {
        self.config = Some(config);
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

    /// Set the answer synthesizer.
    pub fn synthesizer(mut self, synthesizer: Arc<dyn AnswerSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Build the [`QueryPipeline`], validating that all required
    /// collaborators are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<QueryPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;
        let synthesizer = self
            .synthesizer
            .ok_or_else(|| RagError::Config("synthesizer is required".to_string()))?;

        Ok(QueryPipeline { config, embedder, store, synthesizer })
    }
}
