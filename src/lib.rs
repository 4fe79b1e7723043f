//! # ragkit
//!
//! A retrieval-augmented knowledge base: fetch reference text, split it into
//! chunks, embed the chunks, persist them in a topic-keyed similarity index,
//! and answer free-text queries by blending lexical (TF-IDF) and semantic
//! (embedding) relevance into a single ranked result list.
//!
//! ## Overview
//!
//! Two pipelines share the core components:
//!
//! - **Knowledge updater** — [`KnowledgeIngestionPipeline`] ingests a topic
//!   (fetch → chunk → embed → store, at most once per topic) and
//!   [`QueryPipeline`] answers questions from the stored chunks, with a
//!   grounded-first, ungrounded-fallback answering policy.
//! - **Paper search** — [`PaperCorpus`] loads a static corpus with
//!   precomputed embeddings and [`HybridRanker`] ranks it by
//!   `alpha * tfidf + (1 - alpha) * cosine`.
//!
//! Collaborators sit behind async traits and are injected explicitly:
//! [`DocumentSource`] (reference text), [`EmbeddingProvider`] (vectors),
//! [`KnowledgeStore`] (persistence + similarity search), and
//! [`AnswerSynthesizer`] (final answer phrasing). The `wikipedia` and
//! `gemini` cargo features enable the HTTP-backed implementations.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit::{
//!     InMemoryKnowledgeStore, IngestOutcome, KnowledgeConfig,
//!     KnowledgeIngestionPipeline, QueryPipeline,
//! };
//!
//! let store = Arc::new(InMemoryKnowledgeStore::new());
//!
//! let ingestion = KnowledgeIngestionPipeline::builder()
//!     .source(source)
//!     .embedder(embedder.clone())
//!     .store(store.clone())
//!     .build()?;
//!
//! assert!(matches!(
//!     ingestion.ingest("Alan Turing").await?,
//!     IngestOutcome::Stored { .. }
//! ));
//!
//! let queries = QueryPipeline::builder()
//!     .embedder(embedder)
//!     .store(store)
//!     .synthesizer(synthesizer)
//!     .build()?;
//!
//! let answer = queries.answer("Who is Alan Turing?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod lexical;
pub mod query;
pub mod ranker;
pub mod source;
pub mod store;
pub mod synthesis;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{KnowledgeConfig, PaperSearchConfig, DEFAULT_APOLOGY, DEFAULT_NOT_FOUND_PHRASES};
pub use corpus::PaperCorpus;
pub use document::{Chunk, Document, PaperHit, PaperRecord, SearchResult};
pub use embedding::{l2_normalize, EmbeddingProvider};
pub use error::{RagError, Result};
pub use ingest::{IngestOutcome, KnowledgeIngestionPipeline};
pub use lexical::TfIdfIndex;
pub use query::{grounded_prompt, QueryPipeline};
pub use ranker::HybridRanker;
pub use source::DocumentSource;
pub use store::{InMemoryKnowledgeStore, KnowledgeStore};
pub use synthesis::AnswerSynthesizer;

#[cfg(feature = "wikipedia")]
pub use source::WikipediaSource;

#[cfg(feature = "gemini")]
pub use synthesis::GeminiSynthesizer;
