//! Incremental harvest pipeline.
//!
//! This module provides the [`HarvestPipeline`] coordinator that runs one
//! harvest sequentially:
//! 1. **Window**: pick the cold or warm lookback from the store's state
//! 2. **Search**: page through every profile query, backing off on rate limits
//! 3. **Extract**: fetch raw content (or take the file URL) and match links
//! 4. **Append**: write unseen links to the [`ResultStore`], one flush per line
//!
//! One request is in flight at a time. Fixed sleeps between pages and
//! between content fetches keep the run under informal rate limits.

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::harvest::extract::{extract_links, raw_content_url};
use crate::harvest::profile::{ExtractionMode, HarvestProfile};
use crate::harvest::retry::{RetryDecision, RetryPolicy};
use crate::harvest::store::{ResultStore, StoreError};
use crate::harvest::window::{SearchWindow, WindowKind};
use crate::model::{LinkRecord, SearchItem};
use crate::traits::{CodeSearch, ContentFetcher, FetchError};

/// Results per search page; a shorter page is the last one.
pub const PAGE_SIZE: u32 = 100;

// ============================================================================
// Pipeline Types
// ============================================================================

/// Fixed throttling delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    /// Sleep after a full page, before requesting the next one.
    pub page_delay: Duration,
    /// Sleep between raw-content fetches.
    pub file_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(2),
            file_delay: Duration::from_secs(2),
        }
    }
}

impl Pacing {
    /// No sleeping at all.
    pub fn none() -> Self {
        Self {
            page_delay: Duration::ZERO,
            file_delay: Duration::ZERO,
        }
    }
}

/// Outcome of one harvest run.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    /// Cold or warm lookback
    pub window: WindowKind,

    /// `pushed:>` date that bounded the search
    pub since: String,

    /// Rendered query strings, in execution order
    pub queries: Vec<String>,

    pub stats: HarvestStats,
}

/// Counters gathered during a run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestStats {
    /// Search pages successfully received
    pub pages_fetched: usize,

    /// Rate-limit responses seen (each one cost a backoff sleep or ended a query)
    pub rate_limited: usize,

    /// Distinct files after cross-query dedup
    pub distinct_items: usize,

    /// Files whose raw content was fetched
    pub files_fetched: usize,

    /// Files skipped on a non-success status or transport failure
    pub files_skipped: usize,

    /// Lines accepted by the match policy (or file URLs, for playlists)
    pub candidates: usize,

    /// Candidates already in the store, including repeats within this run
    pub duplicates: usize,

    /// Candidates that could not be encoded in the store's format
    pub rejected: usize,

    /// Records appended to the store
    pub new_records: usize,

    /// Wall time of the run (milliseconds)
    pub total_duration_ms: u64,
}

// ============================================================================
// Pipeline Errors
// ============================================================================

/// Errors that abort a run.
///
/// Search and fetch failures never surface here; they shorten the run instead.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Result store failure: {0}")]
    Store(#[from] StoreError),
}

// ============================================================================
// Pipeline Executor
// ============================================================================

/// Sequential fetch-and-append harvester.
///
/// # Example
///
/// ```ignore
/// use link_harvester::{GitHubClient, HarvestPipeline, HarvestProfile};
///
/// let client = GitHubClient::new(&token)?;
/// let pipeline = HarvestPipeline::new(client.clone(), client, HarvestProfile::manifest())
///     .with_cold_start_days(7);
/// let report = pipeline.execute(Path::new("trocalaoca.txt")).await?;
/// println!("{} new links", report.stats.new_records);
/// ```
pub struct HarvestPipeline<S, F>
where
    S: CodeSearch,
    F: ContentFetcher,
{
    search: S,
    fetcher: F,
    profile: HarvestProfile,
    pacing: Pacing,
    retry: RetryPolicy,
    max_pages: u32,
    cold_start_days: u32,
}

impl<S, F> HarvestPipeline<S, F>
where
    S: CodeSearch,
    F: ContentFetcher,
{
    /// Default configuration:
    /// - Pacing: 2s between pages and between files
    /// - Retry: 3 backoffs starting at 60s
    /// - Page cap: 10
    /// - Cold-start lookback: 7 days
    pub fn new(search: S, fetcher: F, profile: HarvestProfile) -> Self {
        Self {
            search,
            fetcher,
            profile,
            pacing: Pacing::default(),
            retry: RetryPolicy::default(),
            max_pages: 10,
            cold_start_days: 7,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_cold_start_days(mut self, days: u32) -> Self {
        self.cold_start_days = days;
        self
    }

    pub fn profile(&self) -> &HarvestProfile {
        &self.profile
    }

    /// Runs one harvest against the store at `store_path`.
    ///
    /// # Errors
    ///
    /// Only store I/O aborts the run. Search errors end pagination with the
    /// pages already gathered; fetch errors skip the one file.
    pub async fn execute(&self, store_path: &Path) -> Result<HarvestReport, PipelineError> {
        self.execute_at(store_path, Utc::now()).await
    }

    /// [`execute`](Self::execute) with an explicit clock.
    #[instrument(skip(self, now), fields(profile = ?self.profile.kind))]
    pub async fn execute_at(
        &self,
        store_path: &Path,
        now: DateTime<Utc>,
    ) -> Result<HarvestReport, PipelineError> {
        let start = Instant::now();
        let mut stats = HarvestStats::default();

        // The window must be chosen before `open` creates the file.
        let window = SearchWindow::select(store_path, self.cold_start_days, now);
        info!(
            window = ?window.kind,
            since = %window.since_date(),
            "Search window selected"
        );

        let mut store = ResultStore::open(store_path, self.profile.format)?;

        let queries: Vec<String> = self
            .profile
            .queries
            .iter()
            .map(|q| q.render(Some(&window)))
            .collect();

        let items = self.search_all(&queries, &mut stats).await;
        stats.distinct_items = items.len();

        if items.is_empty() {
            info!("No new links found");
        } else {
            info!(files = items.len(), "Processing matched files");
            self.harvest_items(&items, &mut store, &mut stats).await?;
        }

        stats.total_duration_ms = start.elapsed().as_millis() as u64;
        info!(
            new_records = stats.new_records,
            duplicates = stats.duplicates,
            files_skipped = stats.files_skipped,
            store = %store.path().display(),
            "Harvest completed"
        );

        Ok(HarvestReport {
            window: window.kind,
            since: window.since_date(),
            queries,
            stats,
        })
    }

    /// Runs every query and merges results, keeping the first item per `html_url`.
    async fn search_all(&self, queries: &[String], stats: &mut HarvestStats) -> Vec<SearchItem> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for query in queries {
            let items = self.paginate(query, stats).await;
            debug!(query = %query, items = items.len(), "Query finished");
            merged.extend(
                items
                    .into_iter()
                    .filter(|item| seen.insert(item.html_url.clone())),
            );
        }
        merged
    }

    /// Pages through one query until a short page, the page cap, or a failure.
    ///
    /// Whatever was gathered before a failure is returned.
    async fn paginate(&self, query: &str, stats: &mut HarvestStats) -> Vec<SearchItem> {
        info!(query = %query, "Running search query");
        let mut items = Vec::new();
        let mut page = 1;
        let mut attempt = 0;

        while page <= self.max_pages {
            match self.search.search_page(query, page, PAGE_SIZE).await {
                Ok(body) => {
                    attempt = 0;
                    stats.pages_fetched += 1;
                    let received = body.items.len();
                    items.extend(body.items);

                    if received < PAGE_SIZE as usize {
                        break;
                    }
                    page += 1;
                    if page <= self.max_pages {
                        pause(self.pacing.page_delay).await;
                    }
                }
                Err(e) if e.is_rate_limit() => {
                    stats.rate_limited += 1;
                    match self.retry.decide(attempt) {
                        RetryDecision::Retry(delay) => {
                            warn!(
                                page,
                                attempt = attempt + 1,
                                delay_secs = delay.as_secs(),
                                "Rate limited, retrying page after backoff"
                            );
                            attempt += 1;
                            pause(delay).await;
                        }
                        RetryDecision::GiveUp => {
                            warn!(
                                page,
                                kept = items.len(),
                                "Rate limit persists, giving up on query"
                            );
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!(page, error = %e, kept = items.len(), "Search request failed");
                    break;
                }
            }
        }

        items
    }

    async fn harvest_items(
        &self,
        items: &[SearchItem],
        store: &mut ResultStore,
        stats: &mut HarvestStats,
    ) -> Result<(), PipelineError> {
        match &self.profile.extraction {
            ExtractionMode::FileUrl => {
                for item in items {
                    let record =
                        LinkRecord::new(raw_content_url(&item.html_url), &item.repository.html_url);
                    stats.candidates += 1;
                    record_link(store, &record, stats)?;
                }
            }
            ExtractionMode::ContentLines { policy, suffix } => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        pause(self.pacing.file_delay).await;
                    }

                    let raw_url = raw_content_url(&item.html_url);
                    let text = match self.fetcher.fetch_text(&raw_url).await {
                        Ok(text) => text,
                        Err(FetchError::Status(status)) => {
                            debug!(url = %raw_url, status, "Skipping file");
                            stats.files_skipped += 1;
                            continue;
                        }
                        Err(e) => {
                            warn!(url = %raw_url, error = %e, "Could not process file");
                            stats.files_skipped += 1;
                            continue;
                        }
                    };
                    stats.files_fetched += 1;

                    for link in extract_links(&text, *policy, suffix) {
                        stats.candidates += 1;
                        let record = LinkRecord::new(link, &item.repository.html_url);
                        record_link(store, &record, stats)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn record_link(
    store: &mut ResultStore,
    record: &LinkRecord,
    stats: &mut HarvestStats,
) -> Result<(), PipelineError> {
    match store.append(record) {
        Ok(true) => {
            debug!(link = %record.link, repository = %record.repository_url, "New link");
            stats.new_records += 1;
        }
        Ok(false) => stats.duplicates += 1,
        Err(StoreError::UnencodableLink(e)) => {
            warn!(error = %e, "Skipping link");
            stats.rejected += 1;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
