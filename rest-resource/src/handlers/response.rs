//! Response envelopes written by the dispatch engine
//!
//! Lists are wrapped with cursor metadata and a `next` link; single
//! resources are wrapped in `data`.
//!
//! # Example
//!
//! ```rust
//! use rest_resource::handlers::{ListResponse, NextLink, Page};
//!
//! let link = NextLink::new("/api/v1/myresource", Vec::new());
//! let response = ListResponse::from_page(Page::new(vec![1, 2], "c2"), 2, "", &link);
//! assert!(response.pagination.has_more);
//! assert_eq!(
//!     response.links.next.as_deref(),
//!     Some("/api/v1/myresource?cursor=c2&limit=2")
//! );
//! ```

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::traits::Page;

/// Single resource response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse<T> {
    /// The response data
    pub data: T,
}

impl<T> ItemResponse<T> {
    /// Create a new item response
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Cursor pagination metadata for list responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CursorMeta {
    /// Limit the handler was invoked with
    pub limit: u32,
    /// Cursor the handler was invoked with
    pub cursor: String,
    /// Cursor for the following page; empty on the last page
    pub next_cursor: String,
    /// Whether a following page exists
    pub has_more: bool,
}

/// Navigation links for list responses
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListLinks {
    /// Link to the following page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Paginated list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Items in the page
    pub data: Vec<T>,
    /// Cursor metadata
    pub pagination: CursorMeta,
    /// Navigation links
    pub links: ListLinks,
}

impl<T> ListResponse<T> {
    /// Build the envelope for a page returned by a handler
    pub fn from_page(page: Page<T>, limit: u32, cursor: &str, link: &NextLink) -> Self {
        let has_more = page.has_more();
        let next = has_more.then(|| link.href(&page.next_cursor, limit));

        Self {
            data: page.items,
            pagination: CursorMeta {
                limit,
                cursor: cursor.to_string(),
                next_cursor: page.next_cursor,
                has_more,
            },
            links: ListLinks { next },
        }
    }

    /// Number of items in the page
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the page is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Builds the URL of the following page
///
/// Every query parameter of the current request is carried over except
/// `cursor` and `limit`, which are replaced.
#[derive(Debug, Clone)]
pub struct NextLink {
    path: String,
    params: Vec<(String, String)>,
}

impl NextLink {
    /// Create a link builder for `path` and the current query parameters
    pub fn new(path: impl Into<String>, params: Vec<(String, String)>) -> Self {
        let params = params
            .into_iter()
            .filter(|(k, _)| k != "cursor" && k != "limit")
            .collect();
        Self {
            path: path.into(),
            params,
        }
    }

    /// URL for the page starting at `cursor`
    pub fn href(&self, cursor: &str, limit: u32) -> String {
        let limit = limit.to_string();
        let mut pairs: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain([("cursor", cursor), ("limit", limit.as_str())])
            .collect();
        pairs.sort_unstable();

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();

        format!("{}?{}", self.path, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> NextLink {
        NextLink::new(
            "/api/v1/myresource",
            vec![
                ("ids_only".to_string(), "true".to_string()),
                ("cursor".to_string(), "old".to_string()),
                ("limit".to_string(), "5".to_string()),
            ],
        )
    }

    #[test]
    fn test_last_page_has_no_next_link() {
        let response = ListResponse::from_page(Page::last(vec![1, 2]), 10, "", &link());
        assert_eq!(response.len(), 2);
        assert!(!response.pagination.has_more);
        assert_eq!(response.pagination.next_cursor, "");
        assert!(response.links.next.is_none());
    }

    #[test]
    fn test_next_link_replaces_cursor_and_keeps_params() {
        let href = link().href("abc/def", 5);
        assert_eq!(
            href,
            "/api/v1/myresource?cursor=abc%2Fdef&ids_only=true&limit=5"
        );
    }

    #[test]
    fn test_next_link_form_encodes_values() {
        let link = NextLink::new(
            "/api/v1/notes",
            vec![("q".to_string(), "a b&c=d".to_string())],
        );
        let href = link.href("x+y", 2);
        assert_eq!(href, "/api/v1/notes?cursor=x%2By&limit=2&q=a+b%26c%3Dd");

        let (_, query) = href.split_once('?').unwrap();
        let decoded: Vec<(String, String)> =
            form_urlencoded::parse(query.as_bytes()).into_owned().collect();
        assert!(decoded.contains(&("q".to_string(), "a b&c=d".to_string())));
        assert!(decoded.contains(&("cursor".to_string(), "x+y".to_string())));
    }

    #[test]
    fn test_envelope_records_request_cursor() {
        let response =
            ListResponse::from_page(Page::new(vec!["a"], "next"), 1, "prev", &link());
        assert_eq!(response.pagination.cursor, "prev");
        assert_eq!(response.pagination.next_cursor, "next");
        assert_eq!(response.pagination.limit, 1);
    }

    #[test]
    fn test_serialized_shape() {
        let response = ListResponse::from_page(Page::last(vec![1, 2]), 10, "", &link());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["pagination"]["next_cursor"], "");
        assert_eq!(json["links"], serde_json::json!({}));
    }

    #[test]
    fn test_item_response_shape() {
        let json = serde_json::to_value(ItemResponse::new(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "data": 7 }));
    }
}
