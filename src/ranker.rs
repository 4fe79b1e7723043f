//! Hybrid lexical + semantic ranking over the paper corpus.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::PaperSearchConfig;
use crate::corpus::PaperCorpus;
use crate::document::PaperHit;
use crate::embedding::{dot, l2_normalize, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::lexical::TfIdfIndex;

/// Ranks papers by a weighted blend of TF-IDF and embedding similarity.
///
/// Per record `i`, the combined score is
/// `alpha * lexical[i] + (1 - alpha) * semantic[i]` where both terms are
/// cosine similarities. No further normalization is applied, so scores are
/// not confined to `[0, 1]`. For a fixed corpus, query, and `alpha` the
/// returned ordering is deterministic: the sort is stable on the original
/// record index.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{HybridRanker, PaperCorpus, PaperSearchConfig};
///
/// let ranker = HybridRanker::new(corpus, embedder, PaperSearchConfig::default());
/// let hits = ranker.rank("machine learning in healthcare").await?;
/// ```
pub struct HybridRanker {
    corpus: PaperCorpus,
    lexical: TfIdfIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    config: PaperSearchConfig,
}

impl HybridRanker {
    /// Build a ranker over `corpus`, fitting the TF-IDF index on the derived
    /// paper texts.
    pub fn new(
        corpus: PaperCorpus,
        embedder: Arc<dyn EmbeddingProvider>,
        config: PaperSearchConfig,
    ) -> Self {
        let lexical = TfIdfIndex::fit(corpus.texts(), config.max_features);
        debug!(
            papers = corpus.len(),
            vocabulary = lexical.vocabulary_size(),
            "lexical index fitted"
        );
        Self { corpus, lexical, embedder, config }
    }

    /// Return a reference to the ranker configuration.
    pub fn config(&self) -> &PaperSearchConfig {
        &self.config
    }

    /// Rank the corpus against `query`, returning the configured `top_k`
    /// papers by descending combined score.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyQuery`] if `query` is blank.
    /// - [`RagError::Pipeline`] if query embedding fails.
    pub async fn rank(&self, query: &str) -> Result<Vec<PaperHit>> {
        self.rank_top_k(query, self.config.top_k).await
    }

    /// Rank with an explicit `top_k`, bypassing the configured value.
    pub async fn rank_top_k(&self, query: &str, top_k: usize) -> Result<Vec<PaperHit>> {
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let mut query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            RagError::Pipeline(format!("query embedding failed: {e}"))
        })?;
        l2_normalize(&mut query_embedding);

        let lexical_scores = self.lexical.score(query);
        let alpha = self.config.alpha;

        let mut scored: Vec<(usize, f32)> = self
            .corpus
            .embeddings()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let semantic = dot(&query_embedding, row);
                (i, alpha * lexical_scores[i] + (1.0 - alpha) * semantic)
            })
            .collect();

        // Stable sort on the original index keeps ties deterministic
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        let hits: Vec<PaperHit> = scored
            .into_iter()
            .map(|(i, score)| {
                let record = &self.corpus.records()[i];
                PaperHit {
                    title: record.title.clone(),
                    authors: record.authors.clone(),
                    abstract_text: record.abstract_text.clone(),
                    score,
                }
            })
            .collect();

        info!(query_len = query.len(), result_count = hits.len(), "papers ranked");
        Ok(hits)
    }
}
