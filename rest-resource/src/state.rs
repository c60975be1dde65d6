//! Application state shared by the HTTP route handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName};

use crate::codec::{Codec, JsonCodec};
use crate::config::Config;
use crate::context::RequestContext;
use crate::dispatch::Dispatcher;

/// State handed to every route handler
///
/// Cloned per request; everything inside is reference counted.
pub struct AppState<C: Codec = JsonCodec> {
    dispatcher: Dispatcher<C>,
    config: Arc<Config>,
    request_id_header: HeaderName,
}

impl<C: Codec> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            config: Arc::clone(&self.config),
            request_id_header: self.request_id_header.clone(),
        }
    }
}

impl<C: Codec> AppState<C> {
    /// Create state around a dispatcher
    pub fn new(dispatcher: Dispatcher<C>, config: Config, request_id_header: HeaderName) -> Self {
        Self {
            dispatcher,
            config: Arc::new(config),
            request_id_header,
        }
    }

    /// Dispatch engine
    pub fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the request context for an incoming request
    pub fn request_context(
        &self,
        path: HashMap<String, String>,
        raw_query: Option<&str>,
        headers: HeaderMap,
    ) -> RequestContext {
        let ctx = RequestContext::from_query(raw_query.unwrap_or_default());
        let request_id = headers
            .get(&self.request_id_header)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let ctx = ctx.with_path_params(path).with_headers(headers);
        match request_id {
            Some(id) => ctx.with_request_id(id),
            None => ctx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ResourceRegistry;
    use axum::http::HeaderValue;

    fn state() -> AppState {
        let config = Config::default();
        let dispatcher = Dispatcher::new(
            Arc::new(ResourceRegistry::new()),
            Arc::new(JsonCodec),
            config.api.clone(),
        );
        AppState::new(dispatcher, config, HeaderName::from_static("x-request-id"))
    }

    #[test]
    fn test_request_context_collects_metadata() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc-123"));
        let path = HashMap::from([
            ("version".to_string(), "v1".to_string()),
            ("resource".to_string(), "notes".to_string()),
        ]);

        let ctx = state()
            .request_context(path, Some("ids_only=1&q=a%20b"), headers);
        assert_eq!(ctx.request_id(), Some("abc-123"));
        assert_eq!(ctx.version(), Some("v1"));
        assert_eq!(ctx.resource(), Some("notes"));
        assert_eq!(ctx.value("q"), Some("a b"));
    }

    #[test]
    fn test_request_context_without_query() {
        let ctx = state().request_context(HashMap::new(), None, HeaderMap::new());
        assert!(ctx.request_id().is_none());
        assert!(ctx.query_pairs().is_empty());
    }
}
