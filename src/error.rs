//! Error types for the `ragkit` crate.

use thiserror::Error;

/// Errors that can occur in knowledge-base operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document source could not produce text for a topic.
    ///
    /// Pipelines recover from this locally (the ingestion pipeline reports
    /// [`IngestOutcome::FetchFailed`](crate::ingest::IngestOutcome::FetchFailed)
    /// instead of propagating).
    #[error("Fetch error ({source_name}): {message}")]
    Fetch {
        /// The document source that produced the error.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the knowledge store backend.
    #[error("Store error: {0}")]
    Store(String),

    /// The answer-synthesis collaborator failed.
    ///
    /// Caught at the query-pipeline boundary and replaced with the configured
    /// apology message; never shown to the end user as an error.
    #[error("Synthesis error ({provider}): {message}")]
    Synthesis {
        /// The synthesis provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The paper embedding cache and the metadata table disagree on row count.
    ///
    /// Fatal at corpus load; serving rankings from misaligned rows would
    /// silently attribute scores to the wrong papers.
    #[error("Corpus mismatch: {embedding_rows} embedding rows vs {record_rows} metadata rows")]
    CorpusMismatch {
        /// Number of rows in the embedding cache.
        embedding_rows: usize,
        /// Number of rows in the metadata table.
        record_rows: usize,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The query was blank or whitespace-only.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for knowledge-base operations.
pub type Result<T> = std::result::Result<T, RagError>;
