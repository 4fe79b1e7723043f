//! Shared mock collaborators for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use ragkit::{l2_normalize, AnswerSynthesizer, DocumentSource, EmbeddingProvider, RagError, Result};

/// Deterministic bag-of-words embedder: each token hashes into a bucket and
/// the vector is L2-normalized, so texts sharing tokens score similar.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut vector = vec![0.0f32; self.dims];
        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % self.dims as u64) as usize] += 1.0;
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Embedder that returns the same fixed vector for every input.
pub struct FixedEmbedder {
    vector: Vec<f32>,
}

impl FixedEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector.clone())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// Document source over a fixed page map, with configurable search hits.
pub struct StaticSource {
    pages: HashMap<String, String>,
    search_hits: Vec<String>,
}

impl StaticSource {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            search_hits: Vec::new(),
        }
    }

    pub fn with_search_hits(mut self, hits: &[&str]) -> Self {
        self.search_hits = hits.iter().map(|s| s.to_string()).collect();
        self
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, topic: &str) -> Result<Option<String>> {
        Ok(self.pages.get(topic).cloned())
    }

    async fn search(&self, _query: &str) -> Result<Vec<String>> {
        Ok(self.search_hits.clone())
    }
}

/// Synthesizer that replays canned responses and records every prompt.
pub struct ScriptedSynthesizer {
    responses: Mutex<Vec<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedSynthesizer {
    /// `responses` are consumed in order; `Err(message)` entries fail the call.
    pub fn new(responses: Vec<std::result::Result<&str, &str>>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| {
                        r.map(str::to_string).map_err(|message| RagError::Synthesis {
                            provider: "Scripted".into(),
                            message: message.to_string(),
                        })
                    })
                    .rev()
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerSynthesizer for ScriptedSynthesizer {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses.lock().unwrap().pop().unwrap_or_else(|| {
            Err(RagError::Synthesis {
                provider: "Scripted".into(),
                message: "no scripted response left".into(),
            })
        })
    }
}
