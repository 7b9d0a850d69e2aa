//! Search window selection.
//!
//! A run is "cold" when the result store is missing or empty, and "warm"
//! otherwise. The store's existence stands in for a last-run timestamp.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lookback used on warm runs.
pub const WARM_LOOKBACK_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Cold,
    Warm,
}

/// Lower time bound for a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub kind: WindowKind,
    pub since: DateTime<Utc>,
}

impl SearchWindow {
    /// Picks the window for `store_path` as of `now`.
    ///
    /// Any error reading the store's metadata is treated like a missing store.
    pub fn select(store_path: &Path, cold_start_days: u32, now: DateTime<Utc>) -> Self {
        let has_content = std::fs::metadata(store_path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);

        if has_content {
            Self {
                kind: WindowKind::Warm,
                since: now - Duration::hours(WARM_LOOKBACK_HOURS),
            }
        } else {
            Self {
                kind: WindowKind::Cold,
                since: cold_start_since(now, cold_start_days),
            }
        }
    }

    /// Date in the `YYYY-MM-DD` form used by `pushed:>` qualifiers.
    pub fn since_date(&self) -> String {
        self.since.format("%Y-%m-%d").to_string()
    }
}

/// `now` minus the lookback, clamped to the Unix epoch.
fn cold_start_since(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|lookback| now.checked_sub_signed(lookback))
        .filter(|since| *since > DateTime::<Utc>::UNIX_EPOCH)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_store_selects_cold_window() {
        let dir = tempfile::tempdir().unwrap();
        let window = SearchWindow::select(&dir.path().join("links.txt"), 7, now());

        assert_eq!(window.kind, WindowKind::Cold);
        assert_eq!(window.since_date(), "2024-03-08");
    }

    #[test]
    fn test_empty_store_selects_cold_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.txt");
        std::fs::write(&path, b"").unwrap();

        let window = SearchWindow::select(&path, 300, now());
        assert_eq!(window.kind, WindowKind::Cold);
        assert_eq!(window.since, now() - Duration::days(300));
    }

    #[test]
    fn test_non_empty_store_selects_warm_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.txt");
        std::fs::write(&path, b"https://example.com/a.m3u\n").unwrap();

        let window = SearchWindow::select(&path, 7, now());
        assert_eq!(window.kind, WindowKind::Warm);
        assert_eq!(window.since_date(), "2024-03-14");
    }

    #[test]
    fn test_huge_cold_start_lookback_clamps_to_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("links.txt");

        for days in [100_000_000, u32::MAX, 30_000] {
            let window = SearchWindow::select(&missing, days, now());
            assert_eq!(window.kind, WindowKind::Cold);
            assert_eq!(window.since_date(), "1970-01-01");
        }
    }

    #[test]
    fn test_directory_at_store_path_is_cold() {
        let dir = tempfile::tempdir().unwrap();
        let window = SearchWindow::select(dir.path(), 10, now());
        assert_eq!(window.kind, WindowKind::Cold);
    }
}
