//! Harvest module - incremental link discovery pipeline.
//!
//! - **Window**: cold/warm lookback via [`SearchWindow`]
//! - **Queries**: [`SearchQuery`] templates grouped into a [`HarvestProfile`]
//! - **Extraction**: [`MatchPolicy`] over cleaned lines of raw file content
//! - **Store**: append-only, deduplicated [`ResultStore`]
//! - **Pipeline**: sequential executor via [`pipeline::HarvestPipeline`]

pub mod extract;
pub mod formats;
pub mod pipeline;
pub mod profile;
pub mod query;
pub mod retry;
pub mod store;
pub mod window;

// Re-export commonly used types
pub use extract::{clean_line, extract_links, raw_content_url, MatchPolicy};
pub use formats::{FormatError, RecordFormat};
pub use profile::{ExtractionMode, HarvestProfile, ProfileKind};
pub use query::SearchQuery;
pub use retry::{RetryDecision, RetryPolicy};
pub use store::{ResultStore, StoreError};
pub use window::{SearchWindow, WindowKind};

pub use pipeline::{HarvestPipeline, HarvestReport, HarvestStats, Pacing, PipelineError, PAGE_SIZE};
