//! Request-scoped parameter access
//!
//! A [`RequestContext`] is built for every dispatched request and dropped when
//! the response is written. It holds raw string values only; handlers parse
//! whatever they need at the call site.
//!
//! ```rust
//! use rest_resource::context::{parse_flag, RequestContext};
//!
//! let ctx = RequestContext::from_query("ids_only=true&limit=10");
//! assert_eq!(ctx.value_with_default("ids_only", "0"), "true");
//! assert_eq!(ctx.value_with_default("missing", "0"), "0");
//! assert!(parse_flag(ctx.value_with_default("ids_only", "0")).unwrap_or(false));
//! ```

use std::collections::HashMap;
use std::str::FromStr;

use axum::http::HeaderMap;
use url::form_urlencoded;

use crate::error::{Error, Result};

/// Path parameter holding the API version
pub const VERSION_PARAM: &str = "version";
/// Path parameter holding the resource name
pub const RESOURCE_PARAM: &str = "resource";
/// Path parameter holding the resource id
pub const ID_PARAM: &str = "id";

/// Per-request accessor for query parameters, path parameters and metadata
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    query: HashMap<String, String>,
    path: HashMap<String, String>,
    headers: HeaderMap,
    request_id: Option<String>,
}

impl RequestContext {
    /// Create a context from already-decoded query parameters
    pub fn new(query: HashMap<String, String>) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    /// Create a context from a raw `application/x-www-form-urlencoded` query
    ///
    /// Invalid UTF-8 in a decoded component is replaced with U+FFFD. A key
    /// that appears more than once keeps its last value.
    pub fn from_query(raw: &str) -> Self {
        let query = form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect::<HashMap<_, _>>();
        Self::new(query)
    }

    /// Attach path parameters
    #[must_use]
    pub fn with_path_params(mut self, path: HashMap<String, String>) -> Self {
        self.path = path;
        self
    }

    /// Set a single path parameter
    #[must_use]
    pub fn with_path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(key.into(), value.into());
        self
    }

    /// Attach request headers
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the request id assigned by the request tracking middleware
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Raw query parameter value
    pub fn value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Raw query parameter value, or `default` when the key is absent
    ///
    /// No coercion is applied to either value.
    pub fn value_with_default<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.value(key).unwrap_or(default)
    }

    /// Parse a query parameter explicitly
    ///
    /// Returns `Ok(None)` for a missing key and [`Error::InvalidParameter`]
    /// when the value does not parse as `T`.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.value(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| Error::invalid_parameter(key, e.to_string()))
            })
            .transpose()
    }

    /// Whether the query string carried `key`
    pub fn contains(&self, key: &str) -> bool {
        self.query.contains_key(key)
    }

    /// Query parameters sorted by key
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Raw path parameter value
    pub fn path_param(&self, key: &str) -> Option<&str> {
        self.path.get(key).map(String::as_str)
    }

    /// API version from the request path
    pub fn version(&self) -> Option<&str> {
        self.path_param(VERSION_PARAM)
    }

    /// Resource name from the request path
    pub fn resource(&self) -> Option<&str> {
        self.path_param(RESOURCE_PARAM)
    }

    /// Resource id from the request path
    pub fn id(&self) -> Option<&str> {
        self.path_param(ID_PARAM)
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request id, if the tracking middleware assigned one
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// Parse a boolean flag the way query strings usually spell them
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_with_default_returns_raw_value() {
        let ctx = RequestContext::from_query("ids_only=1");
        assert_eq!(ctx.value_with_default("ids_only", "0"), "1");
    }

    #[test]
    fn test_missing_key_returns_default() {
        let ctx = RequestContext::default();
        assert_eq!(ctx.value_with_default("ids_only", "0"), "0");
        assert!(ctx.value("ids_only").is_none());
        assert!(!ctx.contains("ids_only"));
    }

    #[test]
    fn test_from_query_decodes_components() {
        let ctx = RequestContext::from_query("name=hello+world&cursor=a%2Fb&flag");
        assert_eq!(ctx.value("name"), Some("hello world"));
        assert_eq!(ctx.value("cursor"), Some("a/b"));
        assert_eq!(ctx.value("flag"), Some(""));
    }

    #[test]
    fn test_from_query_replaces_invalid_utf8() {
        let ctx = RequestContext::from_query("name=%FF&ok=1");
        assert_eq!(ctx.value("name"), Some("\u{FFFD}"));
        assert_eq!(ctx.value("ok"), Some("1"));
    }

    #[test]
    fn test_from_query_last_value_wins() {
        let ctx = RequestContext::from_query("limit=1&limit=2&&=x");
        assert_eq!(ctx.value("limit"), Some("2"));
        assert_eq!(ctx.value(""), Some("x"));
    }

    #[test]
    fn test_empty_query() {
        let ctx = RequestContext::from_query("");
        assert!(ctx.query_pairs().is_empty());
    }

    #[test]
    fn test_parse_is_explicit() {
        let ctx = RequestContext::from_query("limit=10&bad=ten");
        assert_eq!(ctx.parse::<i64>("limit").unwrap(), Some(10));
        assert_eq!(ctx.parse::<i64>("absent").unwrap(), None);

        let err = ctx.parse::<i64>("bad").unwrap_err();
        match err {
            Error::InvalidParameter { name, .. } => assert_eq!(name, "bad"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_flag_spellings() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_flag(raw), Some(true), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_flag(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_flag("yes"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_path_params() {
        let ctx = RequestContext::default()
            .with_path_param(VERSION_PARAM, "v1")
            .with_path_param(RESOURCE_PARAM, "myresource")
            .with_path_param(ID_PARAM, "7");
        assert_eq!(ctx.version(), Some("v1"));
        assert_eq!(ctx.resource(), Some("myresource"));
        assert_eq!(ctx.id(), Some("7"));
        assert_eq!(ctx.path_param("other"), None);
    }

    #[test]
    fn test_query_pairs_sorted() {
        let ctx = RequestContext::from_query("z=1&a=2&m=3");
        assert_eq!(ctx.query_pairs(), vec![("a", "2"), ("m", "3"), ("z", "1")]);
    }

    #[test]
    fn test_request_id() {
        let ctx = RequestContext::default().with_request_id("req-1");
        assert_eq!(ctx.request_id(), Some("req-1"));
    }
}
