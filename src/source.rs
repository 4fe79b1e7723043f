//! Document source collaborators for ingestion.
//!
//! The [`WikipediaSource`] implementation is only available when the
//! `wikipedia` feature is enabled.

use async_trait::async_trait;

use crate::error::Result;

/// An external provider of reference text, resolved by topic label.
///
/// Both calls are fallible, single-shot operations. The ingestion pipeline
/// applies the fallback policy (direct fetch, then search and fetch the top
/// hit); implementations only answer the individual calls.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the full text for `topic`. `Ok(None)` means the topic does not
    /// exist at the source, as opposed to the source being unreachable.
    async fn fetch(&self, topic: &str) -> Result<Option<String>>;

    /// Search the source for `query`, returning candidate titles in
    /// relevance order.
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}

#[cfg(feature = "wikipedia")]
pub use wikipedia::WikipediaSource;

#[cfg(feature = "wikipedia")]
mod wikipedia {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::Deserialize;
    use tracing::{debug, error};

    use super::DocumentSource;
    use crate::error::{RagError, Result};

    /// The default MediaWiki API endpoint (English Wikipedia).
    const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";

    /// Default timeout applied to each API call.
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

    /// A [`DocumentSource`] backed by the MediaWiki query API.
    ///
    /// Fetches plain-text page extracts (`prop=extracts&explaintext`) and
    /// full-text search results (`list=search`). Calls are bounded by a
    /// per-request timeout; expiry surfaces as a retryable
    /// [`RagError::Fetch`], never a panic.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ragkit::source::WikipediaSource;
    ///
    /// let source = WikipediaSource::new()?;
    /// let text = source.fetch("Alan Turing").await?;
    /// ```
    pub struct WikipediaSource {
        client: reqwest::Client,
        api_url: String,
    }

    impl WikipediaSource {
        /// Create a new source against English Wikipedia with the default
        /// timeout.
        pub fn new() -> Result<Self> {
            Self::with_timeout(DEFAULT_TIMEOUT)
        }

        /// Create a new source with a caller-supplied per-request timeout.
        pub fn with_timeout(timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
                RagError::Fetch {
                    source_name: "Wikipedia".into(),
                    message: format!("failed to build HTTP client: {e}"),
                }
            })?;
            Ok(Self { client, api_url: DEFAULT_API_URL.into() })
        }

        /// Override the API endpoint (e.g. another language edition or a
        /// private MediaWiki install).
        pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
            self.api_url = url.into();
            self
        }

        async fn get<T: serde::de::DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
            let response =
                self.client.get(&self.api_url).query(params).send().await.map_err(|e| {
                    error!(source = "Wikipedia", error = %e, "request failed");
                    RagError::Fetch {
                        source_name: "Wikipedia".into(),
                        message: format!("request failed: {e}"),
                    }
                })?;

            if !response.status().is_success() {
                let status = response.status();
                error!(source = "Wikipedia", %status, "API error");
                return Err(RagError::Fetch {
                    source_name: "Wikipedia".into(),
                    message: format!("API returned {status}"),
                });
            }

            response.json().await.map_err(|e| {
                error!(source = "Wikipedia", error = %e, "failed to parse response");
                RagError::Fetch {
                    source_name: "Wikipedia".into(),
                    message: format!("failed to parse response: {e}"),
                }
            })
        }
    }

    // ── MediaWiki API response types ───────────────────────────────────

    #[derive(Deserialize)]
    struct ExtractResponse {
        query: Option<ExtractQuery>,
    }

    #[derive(Deserialize)]
    struct ExtractQuery {
        #[serde(default)]
        pages: Vec<ExtractPage>,
    }

    #[derive(Deserialize)]
    struct ExtractPage {
        extract: Option<String>,
        #[serde(default)]
        missing: bool,
    }

    #[derive(Deserialize)]
    struct SearchResponse {
        query: Option<SearchQuery>,
    }

    #[derive(Deserialize)]
    struct SearchQuery {
        #[serde(default)]
        search: Vec<SearchHit>,
    }

    #[derive(Deserialize)]
    struct SearchHit {
        title: String,
    }

    #[async_trait]
    impl DocumentSource for WikipediaSource {
        async fn fetch(&self, topic: &str) -> Result<Option<String>> {
            debug!(source = "Wikipedia", topic, "fetching page extract");

            let response: ExtractResponse = self
                .get(&[
                    ("action", "query"),
                    ("prop", "extracts"),
                    ("explaintext", "1"),
                    ("redirects", "1"),
                    ("format", "json"),
                    ("formatversion", "2"),
                    ("titles", topic),
                ])
                .await?;

            let text = response
                .query
                .and_then(|q| q.pages.into_iter().next())
                .filter(|page| !page.missing)
                .and_then(|page| page.extract)
                .filter(|extract| !extract.is_empty());

            Ok(text)
        }

        async fn search(&self, query: &str) -> Result<Vec<String>> {
            debug!(source = "Wikipedia", query, "searching titles");

            let response: SearchResponse = self
                .get(&[
                    ("action", "query"),
                    ("list", "search"),
                    ("format", "json"),
                    ("formatversion", "2"),
                    ("srsearch", query),
                ])
                .await?;

            Ok(response
                .query
                .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
                .unwrap_or_default())
        }
    }
}
