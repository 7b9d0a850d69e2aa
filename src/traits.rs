use crate::model::SearchPage;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Rate limited by search endpoint (HTTP 429)")]
    RateLimited,
    #[error("Search endpoint returned HTTP {0}")]
    Status(u16),
    #[error("Search request failed: {0}")]
    Transport(String),
    #[error("Failed to decode search response: {0}")]
    Decode(String),
}

impl SearchError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, SearchError::RateLimited)
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Content endpoint returned HTTP {0}")]
    Status(u16),
    #[error("Content request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait CodeSearch: Send + Sync {
    /// Fetches one page (1-based) of results for a rendered query string.
    async fn search_page(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, SearchError>;
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Returns the raw text behind `url`. Non-2xx answers are `FetchError::Status`.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}
