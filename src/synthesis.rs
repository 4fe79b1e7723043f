//! Answer-synthesis collaborators.
//!
//! The [`GeminiSynthesizer`] implementation is only available when the
//! `gemini` feature is enabled.

use async_trait::async_trait;

use crate::error::Result;

/// An opaque text-completion service used to phrase final answers.
///
/// Text in, text out. Failures surface as [`RagError::Synthesis`]; the query
/// pipeline catches them at its boundary and substitutes the configured
/// apology message, so a synthesis failure is never visible to the end user
/// as an error.
///
/// [`RagError::Synthesis`]: crate::error::RagError::Synthesis
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Complete `prompt` into a natural-language answer.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[cfg(feature = "gemini")]
pub use gemini::GeminiSynthesizer;

#[cfg(feature = "gemini")]
mod gemini {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use tracing::{debug, error};

    use super::AnswerSynthesizer;
    use crate::error::{RagError, Result};

    /// The default model for answer synthesis.
    const DEFAULT_MODEL: &str = "gemini-1.5-flash";

    /// Base URL for the Gemini generateContent API.
    const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

    /// Default timeout applied to each API call.
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// An [`AnswerSynthesizer`] backed by the Gemini generateContent API.
    ///
    /// # Configuration
    ///
    /// - `model` – defaults to `gemini-1.5-flash`.
    /// - `api_key` – from the constructor or the `GOOGLE_API_KEY`
    ///   environment variable.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ragkit::synthesis::GeminiSynthesizer;
    ///
    /// let synthesizer = GeminiSynthesizer::from_env()?;
    /// let answer = synthesizer.complete("Who is Alan Turing?").await?;
    /// ```
    pub struct GeminiSynthesizer {
        client: reqwest::Client,
        api_key: String,
        model: String,
    }

    impl GeminiSynthesizer {
        /// Create a new synthesizer with the given API key and the default
        /// model and timeout.
        pub fn new(api_key: impl Into<String>) -> Result<Self> {
            Self::with_timeout(api_key, DEFAULT_TIMEOUT)
        }

        /// Create a new synthesizer with a caller-supplied per-request timeout.
        pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
            let api_key = api_key.into();
            if api_key.is_empty() {
                return Err(RagError::Synthesis {
                    provider: "Gemini".into(),
                    message: "API key must not be empty".into(),
                });
            }

            let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
                RagError::Synthesis {
                    provider: "Gemini".into(),
                    message: format!("failed to build HTTP client: {e}"),
                }
            })?;

            Ok(Self { client, api_key, model: DEFAULT_MODEL.into() })
        }

        /// Create a new synthesizer using the `GOOGLE_API_KEY` environment
        /// variable.
        pub fn from_env() -> Result<Self> {
            let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| RagError::Synthesis {
                provider: "Gemini".into(),
                message: "GOOGLE_API_KEY environment variable not set".into(),
            })?;
            Self::new(api_key)
        }

        /// Set the model name (e.g. `gemini-1.5-pro`).
        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }
    }

    // ── Gemini API request/response types ──────────────────────────────

    #[derive(Serialize)]
    struct GenerateRequest<'a> {
        contents: Vec<Content<'a>>,
    }

    #[derive(Serialize)]
    struct Content<'a> {
        parts: Vec<Part<'a>>,
    }

    #[derive(Serialize)]
    struct Part<'a> {
        text: &'a str,
    }

    #[derive(Deserialize)]
    struct GenerateResponse {
        #[serde(default)]
        candidates: Vec<Candidate>,
    }

    #[derive(Deserialize)]
    struct Candidate {
        content: Option<CandidateContent>,
    }

    #[derive(Deserialize)]
    struct CandidateContent {
        #[serde(default)]
        parts: Vec<CandidatePart>,
    }

    #[derive(Deserialize)]
    struct CandidatePart {
        text: Option<String>,
    }

    #[async_trait]
    impl AnswerSynthesizer for GeminiSynthesizer {
        async fn complete(&self, prompt: &str) -> Result<String> {
            debug!(provider = "Gemini", model = %self.model, prompt_len = prompt.len(), "completing prompt");

            let url = format!("{API_BASE_URL}/{}:generateContent", self.model);
            let body = GenerateRequest {
                contents: vec![Content { parts: vec![Part { text: prompt }] }],
            };

            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    error!(provider = "Gemini", error = %e, "request failed");
                    RagError::Synthesis {
                        provider: "Gemini".into(),
                        message: format!("request failed: {e}"),
                    }
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                error!(provider = "Gemini", %status, "API error");
                return Err(RagError::Synthesis {
                    provider: "Gemini".into(),
                    message: format!("API returned {status}: {detail}"),
                });
            }

            let parsed: GenerateResponse = response.json().await.map_err(|e| {
                error!(provider = "Gemini", error = %e, "failed to parse response");
                RagError::Synthesis {
                    provider: "Gemini".into(),
                    message: format!("failed to parse response: {e}"),
                }
            })?;

            parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .and_then(|c| c.parts.into_iter().next())
                .and_then(|p| p.text)
                .ok_or_else(|| RagError::Synthesis {
                    provider: "Gemini".into(),
                    message: "response contained no text candidates".into(),
                })
        }
    }
}
