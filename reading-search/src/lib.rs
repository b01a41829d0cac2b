//! Open Library catalog search.

use async_trait::async_trait;
use reading_core::Book;
use reading_core::search::{BookSearch, SearchError, SearchQuery, SearchResponse, candidates_from_docs};
use reqwest::{Client, Url};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Searches `{base_url}/search.json` by title and optional author.
pub struct OpenLibraryClient {
    client: Client,
    base_url: String,
}

impl OpenLibraryClient {
    /// Uses `OPEN_LIBRARY_URL` when set, else [`DEFAULT_BASE_URL`].
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: std::env::var("OPEN_LIBRARY_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request URL for `query`, with parameters percent-encoded.
    pub fn search_url(&self, query: &SearchQuery) -> Result<Url, SearchError> {
        let endpoint = format!("{}/search.json", self.base_url.trim_end_matches('/'));
        let mut params = vec![("title", query.title())];
        if let Some(author) = query.author() {
            params.push(("author", author));
        }
        Url::parse_with_params(&endpoint, &params)
            .map_err(|e| SearchError::Http(format!("invalid search URL '{endpoint}': {e}")))
    }
}

impl Default for OpenLibraryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookSearch for OpenLibraryClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>, SearchError> {
        let url = self.search_url(query)?;
        debug!(%url, "Searching catalog");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "Catalog search failed");
            return Err(SearchError::Http(format!("catalog returned {status}")));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        Ok(candidates_from_docs(&body.docs))
    }
}
