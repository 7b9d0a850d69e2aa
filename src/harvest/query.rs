//! Search query construction.

use serde::{Deserialize, Serialize};

use crate::harvest::window::SearchWindow;

/// Template for one code-search query.
///
/// Rendered as `(kw1 OR kw2) AND term extension:e path:p pushed:>date`,
/// omitting whichever parts are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Any-of keywords, OR'd together.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Term every result must contain.
    #[serde(default)]
    pub required: Option<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub paths: Vec<String>,
    /// Whether the rendered query carries the `pushed:>` recency filter.
    #[serde(default = "default_recency")]
    pub recency: bool,
}

fn default_recency() -> bool {
    true
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            required: None,
            extensions: Vec::new(),
            paths: Vec::new(),
            recency: default_recency(),
        }
    }
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self, term: impl Into<String>) -> Self {
        self.required = Some(term.into());
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    pub fn path(mut self, glob: impl Into<String>) -> Self {
        self.paths.push(glob.into());
        self
    }

    pub fn without_recency(mut self) -> Self {
        self.recency = false;
        self
    }

    /// Renders the `q` parameter, adding `pushed:>` when a window is given.
    pub fn render(&self, window: Option<&SearchWindow>) -> String {
        let mut parts: Vec<String> = Vec::new();

        let keywords: Vec<&str> = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        match keywords.len() {
            0 => {}
            1 => parts.push(keywords[0].to_string()),
            _ => parts.push(format!("({})", keywords.join(" OR "))),
        }

        if let Some(term) = self.required.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !parts.is_empty() {
                parts.push("AND".to_string());
            }
            parts.push(quote_term(term));
        }

        parts.extend(self.extensions.iter().map(|e| format!("extension:{}", e)));
        parts.extend(self.paths.iter().map(|p| format!("path:{}", p)));

        if self.recency {
            if let Some(window) = window {
                parts.push(format!("pushed:>{}", window.since_date()));
            }
        }

        parts.join(" ")
    }
}

fn quote_term(term: &str) -> String {
    if term.chars().any(char::is_whitespace) {
        format!("\"{}\"", term.replace('"', ""))
    } else {
        term.to_string()
    }
}
