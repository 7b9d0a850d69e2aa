//! Harvest profiles: what to search for and how to turn hits into records.

use serde::{Deserialize, Serialize};

use crate::harvest::extract::MatchPolicy;
use crate::harvest::formats::RecordFormat;
use crate::harvest::query::SearchQuery;

/// How a matched file becomes records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Fetch the file's raw content and record matching lines.
    ContentLines { policy: MatchPolicy, suffix: String },
    /// Record the file's own raw-content URL; nothing is fetched.
    FileUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Manifest,
    Playlist,
}

impl std::str::FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manifest" | "mpd" => Ok(ProfileKind::Manifest),
            "playlist" | "m3u" => Ok(ProfileKind::Playlist),
            other => Err(format!("unknown profile '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestProfile {
    pub kind: ProfileKind,
    pub queries: Vec<SearchQuery>,
    pub extraction: ExtractionMode,
    pub format: RecordFormat,
    pub default_store: String,
}

impl HarvestProfile {
    /// DASH manifests: scan text, markdown and JSON files for `.mpd` links,
    /// one query per extension.
    pub fn manifest() -> Self {
        let queries = ["txt", "md", "json"]
            .into_iter()
            .map(|ext| {
                SearchQuery::new()
                    .keywords(["manifest", "DASH"])
                    .required("mpd")
                    .extension(ext)
            })
            .collect();

        Self {
            kind: ProfileKind::Manifest,
            queries,
            extraction: ExtractionMode::ContentLines {
                policy: MatchPolicy::Strict,
                suffix: ".mpd".to_string(),
            },
            format: RecordFormat::Annotated,
            default_store: "trocalaoca.txt".to_string(),
        }
    }

    /// M3U playlists: the playlist files themselves are the links.
    pub fn playlist() -> Self {
        Self {
            kind: ProfileKind::Playlist,
            queries: vec![SearchQuery::new().extension("m3u")],
            extraction: ExtractionMode::FileUrl,
            format: RecordFormat::Plain,
            default_store: "todas.txt".to_string(),
        }
    }

    pub fn for_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Manifest => Self::manifest(),
            ProfileKind::Playlist => Self::playlist(),
        }
    }

    /// Overrides the match policy; no-op for profiles that do not scan content.
    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        if let ExtractionMode::ContentLines { policy: p, .. } = &mut self.extraction {
            *p = policy;
        }
        self
    }

    #[must_use]
    pub fn with_queries(mut self, queries: Vec<SearchQuery>) -> Self {
        self.queries = queries;
        self
    }
}
