use serde::{Deserialize, Serialize};

/// One page of the code-search response. Only `items` is consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// A single file matched by a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub html_url: String, // e.g. https://github.com/o/r/blob/main/list.txt
    pub repository: RepositoryRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    #[serde(default)]
    pub full_name: String,
    pub html_url: String,
}

/// A link confirmed by the pipeline, with the repository it was found in.
///
/// Identity is the `link` alone; `repository_url` is provenance only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub link: String,
    pub repository_url: String,
}

impl LinkRecord {
    pub fn new(link: impl Into<String>, repository_url: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            repository_url: repository_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_page_deserializes_github_shape() {
        let body = serde_json::json!({
            "total_count": 1,
            "incomplete_results": false,
            "items": [{
                "name": "streams.txt",
                "path": "lists/streams.txt",
                "sha": "abc",
                "html_url": "https://github.com/octo/tv/blob/main/lists/streams.txt",
                "repository": {
                    "id": 1,
                    "full_name": "octo/tv",
                    "html_url": "https://github.com/octo/tv"
                }
            }]
        });

        let page: SearchPage = serde_json::from_value(body).unwrap();
        assert_eq!(page.total_count, Some(1));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].repository.html_url, "https://github.com/octo/tv");
    }

    #[test]
    fn test_search_page_without_items_is_empty() {
        let page: SearchPage = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
    }
}
