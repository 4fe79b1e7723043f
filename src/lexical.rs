//! TF-IDF lexical index for keyword-style relevance.
//!
//! Built once over a fixed corpus; refitting on ingestion is not supported.
//! The dynamic knowledge store relies on embedding similarity instead, so
//! this index applies to the static paper corpus where the full document set
//! is known upfront.
//!
//! Scoring uses smooth inverse document frequency (`ln((1 + n) / (1 + df)) + 1`)
//! with L2-normalized document vectors, so [`TfIdfIndex::score`] is the cosine
//! similarity between the query's term vector and each document's.

use std::collections::HashMap;

/// English stop words excluded from the term vocabulary.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had",
    "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "if", "in", "into",
    "is", "it", "its", "itself", "just", "me", "more", "most", "my", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "very",
    "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "you", "your", "yours",
];

/// A term-frequency/inverse-document-frequency index over a fixed corpus.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::TfIdfIndex;
///
/// let index = TfIdfIndex::fit(&corpus_texts, 5000);
/// let scores = index.score("machine learning in healthcare");
/// assert_eq!(scores.len(), corpus_texts.len());
/// ```
#[derive(Debug, Clone)]
pub struct TfIdfIndex {
    /// term → column index in the vocabulary.
    vocabulary: HashMap<String, usize>,
    /// Smooth IDF weight per vocabulary column.
    idf: Vec<f32>,
    /// One L2-normalized sparse row per corpus document, sorted by column.
    rows: Vec<Vec<(usize, f32)>>,
}

impl TfIdfIndex {
    /// Build an index over `corpus`, keeping at most `max_features` terms.
    ///
    /// Terms are lowercased alphanumeric tokens of at least two characters,
    /// with stop words excluded. When the vocabulary exceeds `max_features`,
    /// the terms with the highest collection frequency are kept.
    pub fn fit<S: AsRef<str>>(corpus: &[S], max_features: usize) -> Self {
        let doc_counts: Vec<HashMap<String, usize>> =
            corpus.iter().map(|text| term_counts(text.as_ref())).collect();

        // Collection frequency and document frequency per term
        let mut collection_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for counts in &doc_counts {
            for (term, count) in counts {
                *collection_freq.entry(term).or_default() += count;
                *doc_freq.entry(term).or_default() += 1;
            }
        }

        // Cap the vocabulary by collection frequency, ties broken
        // alphabetically so fitting is deterministic
        let mut terms: Vec<(&str, usize)> =
            collection_freq.iter().map(|(t, c)| (*t, *c)).collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(max_features);
        terms.sort_by(|a, b| a.0.cmp(b.0));

        let vocabulary: HashMap<String, usize> =
            terms.iter().enumerate().map(|(i, (t, _))| (t.to_string(), i)).collect();

        let n = corpus.len() as f32;
        let mut idf = vec![0.0; vocabulary.len()];
        for (term, _) in terms {
            let df = doc_freq[term] as f32;
            idf[vocabulary[term]] = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
        }

        let rows = doc_counts.iter().map(|counts| weigh(counts, &vocabulary, &idf)).collect();

        Self { vocabulary, idf, rows }
    }

    /// Cosine similarity between `query` and every corpus document, in corpus
    /// order.
    ///
    /// Documents sharing no vocabulary terms with the query score 0.0, as
    /// does everything when the query contains no indexed terms at all.
    pub fn score(&self, query: &str) -> Vec<f32> {
        let counts = term_counts(query);
        let query_row = weigh(&counts, &self.vocabulary, &self.idf);
        self.rows.iter().map(|row| sparse_dot(&query_row, row)).collect()
    }

    /// Number of documents the index was fitted on.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` if the index was fitted on an empty corpus.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of terms in the fitted vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Count indexable terms in `text`: lowercased alphanumeric runs of at least
/// two characters, stop words excluded.
fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in text.split(|c: char| !c.is_alphanumeric()) {
        if token.chars().count() < 2 {
            continue;
        }
        let token = token.to_lowercase();
        if STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        *counts.entry(token).or_default() += 1;
    }
    counts
}

/// Turn raw term counts into an L2-normalized sparse TF-IDF row.
fn weigh(
    counts: &HashMap<String, usize>,
    vocabulary: &HashMap<String, usize>,
    idf: &[f32],
) -> Vec<(usize, f32)> {
    let mut row: Vec<(usize, f32)> = counts
        .iter()
        .filter_map(|(term, count)| {
            vocabulary.get(term).map(|&col| (col, *count as f32 * idf[col]))
        })
        .collect();
    row.sort_by_key(|(col, _)| *col);

    let norm: f32 = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
    }
    row
}

/// Dot product of two sparse rows sorted by column.
fn sparse_dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let mut sum = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_are_excluded() {
        let index = TfIdfIndex::fit(&["the quick brown fox"], 5000);
        assert_eq!(index.vocabulary_size(), 3);
    }

    #[test]
    fn matching_document_scores_highest() {
        let corpus =
            ["neural networks for vision", "graph databases", "transformer language models"];
        let scores = TfIdfIndex::fit(&corpus, 5000).score("language models");
        assert!(scores[2] > scores[0]);
        assert!(scores[2] > scores[1]);
    }

    #[test]
    fn unindexed_query_scores_zero_everywhere() {
        let index = TfIdfIndex::fit(&["alpha beta", "gamma delta"], 5000);
        assert_eq!(index.score("zzzz"), vec![0.0, 0.0]);
    }

    #[test]
    fn identical_document_scores_near_one() {
        let corpus = ["quantum error correction codes", "protein folding simulation"];
        let scores = TfIdfIndex::fit(&corpus, 5000).score("quantum error correction codes");
        assert!((scores[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn max_features_caps_vocabulary() {
        let index = TfIdfIndex::fit(&["one two three four five six seven"], 3);
        assert_eq!(index.vocabulary_size(), 3);
    }
}
