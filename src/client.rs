//! HTTP implementation of the search and content seams, backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::{debug, instrument};

use crate::model::SearchPage;
use crate::traits::{CodeSearch, ContentFetcher, FetchError, SearchError};

pub const DEFAULT_SEARCH_URL: &str = "https://api.github.com/search/code";
const USER_AGENT: &str = concat!("link-harvester/", env!("CARGO_PKG_VERSION"));

/// GitHub code-search client.
///
/// Search calls carry the token; raw-content calls go out unauthenticated
/// with a short per-request timeout.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    raw: Client,
    search_url: String,
    content_timeout: Duration,
}

impl GitHubClient {
    /// Builds a client authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Transport`] if the token is not a valid header
    /// value or the TLS backend cannot be initialised.
    pub fn new(token: &str) -> Result<Self, SearchError> {
        Self::build(token, Client::builder)
    }

    /// Builds both inner clients from `base`.
    fn build(token: &str, base: impl Fn() -> ClientBuilder) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|e| SearchError::Transport(format!("invalid token header: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let http = base()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        let raw = base()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            raw,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            content_timeout: Duration::from_secs(10),
        })
    }

    /// Points the client at another search endpoint (GitHub Enterprise, tests).
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    pub fn with_content_timeout(mut self, timeout: Duration) -> Self {
        self.content_timeout = timeout;
        self
    }
}

#[async_trait]
impl CodeSearch for GitHubClient {
    #[instrument(skip(self), fields(url = %self.search_url))]
    async fn search_page(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, SearchError> {
        let response = self
            .http
            .get(&self.search_url)
            .query(&[
                ("q", query.to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let page_body: SearchPage = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        debug!(items = page_body.items.len(), "Search page received");
        Ok(page_body)
    }
}

#[async_trait]
impl ContentFetcher for GitHubClient {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .raw
            .get(url)
            .timeout(self.content_timeout)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}
