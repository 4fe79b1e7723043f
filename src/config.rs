//! Configuration for the knowledge-base and paper-search pipelines.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default phrases that mark a grounded answer as a miss.
///
/// Matching is case-insensitive. This is a best-effort heuristic over model
/// output, not a semantic guarantee.
pub const DEFAULT_NOT_FOUND_PHRASES: &[&str] = &["does not contain", "no information", "not found"];

/// Default apology returned when answer synthesis itself fails.
pub const DEFAULT_APOLOGY: &str = "Sorry, I couldn't find anything related.";

/// Configuration for the knowledge-updater pipelines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
    /// Phrases that mark a grounded answer as a miss (case-insensitive).
    pub not_found_phrases: Vec<String>,
    /// Message substituted when answer synthesis fails.
    pub apology_message: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            top_k: 3,
            not_found_phrases: DEFAULT_NOT_FOUND_PHRASES.iter().map(|s| s.to_string()).collect(),
            apology_message: DEFAULT_APOLOGY.to_string(),
        }
    }
}

impl KnowledgeConfig {
    /// Create a new builder for constructing a [`KnowledgeConfig`].
    pub fn builder() -> KnowledgeConfigBuilder {
        KnowledgeConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`KnowledgeConfig`].
#[derive(Debug, Clone, Default)]
pub struct KnowledgeConfigBuilder {
    config: KnowledgeConfig,
}

impl KnowledgeConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the number of chunks retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Replace the not-found phrase list.
    pub fn not_found_phrases(mut self, phrases: Vec<String>) -> Self {
        self.config.not_found_phrases = phrases;
        self
    }

    /// Set the message substituted when answer synthesis fails.
    pub fn apology_message(mut self, message: impl Into<String>) -> Self {
        self.config.apology_message = message.into();
        self
    }

    /// Build the [`KnowledgeConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_size == 0` or `top_k == 0`.
    pub fn build(self) -> Result<KnowledgeConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

/// Configuration for the paper search engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperSearchConfig {
    /// Number of papers returned per search.
    pub top_k: usize,
    /// Blend weight between lexical and semantic scores: `alpha * lexical +
    /// (1 - alpha) * semantic`. Must lie in `[0, 1]`.
    pub alpha: f32,
    /// Maximum number of terms kept in the TF-IDF vocabulary.
    pub max_features: usize,
}

impl Default for PaperSearchConfig {
    fn default() -> Self {
        Self { top_k: 5, alpha: 0.6, max_features: 5000 }
    }
}

impl PaperSearchConfig {
    /// Create a new builder for constructing a [`PaperSearchConfig`].
    pub fn builder() -> PaperSearchConfigBuilder {
        PaperSearchConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PaperSearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct PaperSearchConfigBuilder {
    config: PaperSearchConfig,
}

impl PaperSearchConfigBuilder {
    /// Set the number of papers returned per search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the lexical/semantic blend weight.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.config.alpha = alpha;
        self
    }

    /// Set the maximum TF-IDF vocabulary size.
    pub fn max_features(mut self, max_features: usize) -> Self {
        self.config.max_features = max_features;
        self
    }

    /// Build the [`PaperSearchConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `alpha` is outside `[0, 1]` or not finite
    /// - `top_k == 0`
    /// - `max_features == 0`
    pub fn build(self) -> Result<PaperSearchConfig> {
        if !self.config.alpha.is_finite() || !(0.0..=1.0).contains(&self.config.alpha) {
            return Err(RagError::Config(format!(
                "alpha ({}) must lie in [0, 1]",
                self.config.alpha
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.max_features == 0 {
            return Err(RagError::Config("max_features must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
