//! Line cleaning, link matching and raw-content URL derivation.

use serde::{Deserialize, Serialize};

/// Rule deciding whether a cleaned line is a target link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Line starts with `http` and ends exactly with the suffix.
    #[default]
    Strict,
    /// Line contains the suffix and `http` anywhere. Noisier; kept for
    /// stores produced by older runs.
    Loose,
}

impl MatchPolicy {
    pub fn matches(&self, line: &str, suffix: &str) -> bool {
        match self {
            MatchPolicy::Strict => line.starts_with("http") && line.ends_with(suffix),
            MatchPolicy::Loose => line.contains(suffix) && line.contains("http"),
        }
    }
}

impl std::str::FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(MatchPolicy::Strict),
            "loose" => Ok(MatchPolicy::Loose),
            other => Err(format!("unknown match policy '{}'", other)),
        }
    }
}

/// Trims whitespace, then one layer of matching surrounding quotes.
pub fn clean_line(line: &str) -> &str {
    let trimmed = line.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].trim();
        }
    }
    trimmed
}

/// Returns every line of `text` that the policy accepts, cleaned.
pub fn extract_links<'a>(text: &'a str, policy: MatchPolicy, suffix: &str) -> Vec<&'a str> {
    text.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty() && policy.matches(line, suffix))
        .collect()
}

/// Maps a `github.com/.../blob/...` page URL to its raw-content URL.
pub fn raw_content_url(html_url: &str) -> String {
    html_url
        .replacen("://github.com/", "://raw.githubusercontent.com/", 1)
        .replacen("/blob/", "/", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_policy_extracts_quoted_link() {
        let line = "  'http://cdn.example.com/stream/x.mpd'  ";
        let cleaned = clean_line(line);
        assert_eq!(cleaned, "http://cdn.example.com/stream/x.mpd");
        assert!(MatchPolicy::Strict.matches(cleaned, ".mpd"));
    }

    #[test]
    fn test_prose_line_rejected_by_strict_accepted_by_loose() {
        let line = clean_line("see http://example.com/x.mpd for details");

        assert!(!MatchPolicy::Strict.matches(line, ".mpd"));
        assert!(MatchPolicy::Loose.matches(line, ".mpd"));
    }

    #[test]
    fn test_default_policy_is_strict() {
        assert_eq!(MatchPolicy::default(), MatchPolicy::Strict);
        assert_eq!("LOOSE".parse::<MatchPolicy>(), Ok(MatchPolicy::Loose));
        assert!("fuzzy".parse::<MatchPolicy>().is_err());
    }

    #[test]
    fn test_clean_line_strips_only_one_quote_layer() {
        assert_eq!(clean_line("\"'https://a/b.mpd'\""), "'https://a/b.mpd'");
        assert_eq!(clean_line("'unbalanced\""), "'unbalanced\"");
        assert_eq!(clean_line("\""), "\"");
    }

    #[test]
    fn test_extract_links_from_file_body() {
        let body = "# playlist\n\
                    https://cdn.example.com/a.mpd\n\
                    \"https://cdn.example.com/b.mpd\",\n\
                    https://cdn.example.com/c.mpd?token=1\n\
                    \n\
                    ftp://cdn.example.com/d.mpd\n";

        let strict = extract_links(body, MatchPolicy::Strict, ".mpd");
        assert_eq!(strict, vec!["https://cdn.example.com/a.mpd"]);

        let loose = extract_links(body, MatchPolicy::Loose, ".mpd");
        assert_eq!(loose.len(), 3);
    }

    #[test]
    fn test_raw_content_url() {
        assert_eq!(
            raw_content_url("https://github.com/octo/tv/blob/main/lists/x.txt"),
            "https://raw.githubusercontent.com/octo/tv/main/lists/x.txt"
        );
        // Only the first "/blob/" is the view segment.
        assert_eq!(
            raw_content_url("https://github.com/octo/tv/blob/dev/blob/x.txt"),
            "https://raw.githubusercontent.com/octo/tv/dev/blob/x.txt"
        );
    }
}
