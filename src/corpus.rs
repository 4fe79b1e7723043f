//! Loading the static paper corpus: metadata plus a precomputed embedding cache.
//!
//! The two files are positionally coupled: row `i` of the embedding cache
//! belongs to row `i` of the metadata table. That coupling is validated at
//! load time and a mismatch aborts initialization; serving rankings from
//! misaligned rows would silently score the wrong papers.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::document::PaperRecord;
use crate::embedding::l2_normalize;
use crate::error::{RagError, Result};

/// The static research-paper corpus: records, their indexed texts, and one
/// L2-normalized embedding per record.
///
/// Loaded once at startup and immutable thereafter.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::PaperCorpus;
///
/// let corpus = PaperCorpus::load("data/papers.json", "data/paper_embeddings.json")?;
/// assert_eq!(corpus.len(), corpus.embeddings().len());
/// ```
#[derive(Debug, Clone)]
pub struct PaperCorpus {
    records: Vec<PaperRecord>,
    texts: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl PaperCorpus {
    /// Load the corpus from a JSON metadata file (an array of paper records)
    /// and a JSON embedding cache (an array of shape `[num_docs][dim]`).
    ///
    /// Embedding rows are L2-normalized after loading.
    ///
    /// # Errors
    ///
    /// - [`RagError::Pipeline`] if either file cannot be read or parsed.
    /// - [`RagError::CorpusMismatch`] if the row counts disagree.
    /// - [`RagError::Config`] if the embedding rows have inconsistent
    ///   dimensions or the corpus is empty.
    pub fn load(
        metadata_path: impl AsRef<Path>,
        embeddings_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let records: Vec<PaperRecord> = read_json(metadata_path.as_ref())?;
        let embeddings: Vec<Vec<f32>> = read_json(embeddings_path.as_ref())?;
        Self::from_parts(records, embeddings)
    }

    /// Build a corpus from already-loaded parts, applying the same validation
    /// and normalization as [`load`](PaperCorpus::load).
    pub fn from_parts(records: Vec<PaperRecord>, mut embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if embeddings.len() != records.len() {
            return Err(RagError::CorpusMismatch {
                embedding_rows: embeddings.len(),
                record_rows: records.len(),
            });
        }
        if records.is_empty() {
            return Err(RagError::Config("paper corpus is empty".to_string()));
        }

        let dim = embeddings[0].len();
        if dim == 0 {
            return Err(RagError::Config("embedding rows must not be empty".to_string()));
        }
        if let Some((i, row)) = embeddings.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(RagError::Config(format!(
                "embedding row {i} has dimension {} but row 0 has {dim}",
                row.len()
            )));
        }

        for row in &mut embeddings {
            l2_normalize(row);
        }

        let texts = records.iter().map(PaperRecord::indexed_text).collect();

        info!(papers = records.len(), dimensions = dim, "paper corpus loaded");
        Ok(Self { records, texts, embeddings })
    }

    /// Number of papers in the corpus.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false` for a successfully constructed corpus.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The paper records, in row order.
    pub fn records(&self) -> &[PaperRecord] {
        &self.records
    }

    /// The derived `"{title}. {abstract}"` texts used for lexical indexing.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// The normalized embedding rows, positionally aligned with
    /// [`records`](PaperCorpus::records).
    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| {
        RagError::Pipeline(format!("failed to open '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        RagError::Pipeline(format!("failed to parse '{}': {e}", path.display()))
    })
}
