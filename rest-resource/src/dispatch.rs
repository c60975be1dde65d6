//! Dispatch engine
//!
//! Resolves the handler for a request, checks the API version, resolves the
//! pagination parameters and runs the operation through the codec. The engine
//! knows nothing about handler-specific query parameters.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::codec::{Codec, JsonCodec};
use crate::config::ApiConfig;
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::handlers::{DynResourceHandler, Encoded, ListCall, NextLink, Operation};
use crate::registry::ResourceRegistry;

/// Query parameter carrying the page size
pub const LIMIT_PARAM: &str = "limit";

/// Query parameter carrying the pagination cursor
pub const CURSOR_PARAM: &str = "cursor";

/// A request as seen by the dispatch engine
#[derive(Debug, Clone, Copy)]
pub struct DispatchRequest<'a> {
    /// Operation selected by the route
    pub operation: Operation,
    /// Resource name from the path
    pub resource: &'a str,
    /// API version from the path
    pub version: &'a str,
    /// Resource id, for read, update and delete
    pub id: Option<&'a str>,
    /// Request context handed to the handler
    pub ctx: &'a RequestContext,
    /// Raw request body, for create and update
    pub body: &'a [u8],
}

impl<'a> DispatchRequest<'a> {
    /// Request for a collection operation (list, create)
    pub fn collection(
        operation: Operation,
        resource: &'a str,
        version: &'a str,
        ctx: &'a RequestContext,
    ) -> Self {
        Self {
            operation,
            resource,
            version,
            id: None,
            ctx,
            body: &[],
        }
    }

    /// Request for an item operation (read, update, delete)
    pub fn item(
        operation: Operation,
        resource: &'a str,
        version: &'a str,
        id: &'a str,
        ctx: &'a RequestContext,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::collection(operation, resource, version, ctx)
        }
    }

    /// Attach a request body
    pub fn with_body(mut self, body: &'a [u8]) -> Self {
        self.body = body;
        self
    }
}

/// Routes requests to registered handlers
pub struct Dispatcher<C: Codec = JsonCodec> {
    registry: Arc<ResourceRegistry<C>>,
    codec: Arc<C>,
    api: ApiConfig,
}

impl<C: Codec> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            codec: Arc::clone(&self.codec),
            api: self.api.clone(),
        }
    }
}

impl<C: Codec> Dispatcher<C> {
    /// Create a dispatcher over a frozen registry
    pub fn new(registry: Arc<ResourceRegistry<C>>, codec: Arc<C>, api: ApiConfig) -> Self {
        Self {
            registry,
            codec,
            api,
        }
    }

    /// Registry requests are dispatched against
    pub fn registry(&self) -> &ResourceRegistry<C> {
        &self.registry
    }

    /// Codec used for bodies
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Run a request and return the encoded result
    pub async fn dispatch(&self, request: DispatchRequest<'_>) -> Result<Encoded> {
        let handler = self.registry.resolve(request.resource)?;
        check_version(handler.as_ref(), request.version)?;

        tracing::debug!(
            resource = request.resource,
            version = request.version,
            operation = %request.operation,
            id = request.id,
            "Dispatching request"
        );

        let codec = self.codec.as_ref();
        let ctx = request.ctx;

        match request.operation {
            Operation::List => {
                let limit = self.resolve_limit(ctx)?;
                let cursor = ctx.value(CURSOR_PARAM).unwrap_or_default();
                let link = NextLink::new(
                    self.collection_path(request.version, request.resource),
                    owned_pairs(ctx),
                );
                let call = ListCall {
                    ctx,
                    limit,
                    cursor,
                    version: request.version,
                    link: &link,
                };
                handler.dispatch_list(codec, call).await
            }
            Operation::Create => {
                handler
                    .dispatch_create(codec, ctx, request.body, request.version)
                    .await
            }
            Operation::Read => {
                let id = require_id(&request)?;
                handler.dispatch_read(codec, ctx, id, request.version).await
            }
            Operation::Update => {
                let id = require_id(&request)?;
                handler
                    .dispatch_update(codec, ctx, id, request.body, request.version)
                    .await
            }
            Operation::Delete => {
                let id = require_id(&request)?;
                handler.dispatch_delete(codec, ctx, id, request.version).await
            }
        }
    }

    /// Run a request and frame the outcome as an HTTP response
    pub async fn respond(&self, request: DispatchRequest<'_>) -> Response {
        match self.dispatch(request).await {
            Ok(encoded) => self.encoded_response(encoded),
            Err(e) => e.into_response(),
        }
    }

    /// Effective page size for a list request
    ///
    /// A missing, empty or non-positive `limit` yields `api.default_limit`;
    /// values above `api.max_limit` are clamped. Anything that is not an
    /// integer is rejected. The result is always in `1..=max_limit`, even
    /// for an `ApiConfig` that never went through [`ApiConfig::validate`].
    pub fn resolve_limit(&self, ctx: &RequestContext) -> Result<u32> {
        let max_limit = self.max_limit();
        let raw = match ctx.value(LIMIT_PARAM).map(str::trim) {
            None | Some("") => return Ok(self.fallback_limit()),
            Some(raw) => raw,
        };

        let requested: i64 = raw.parse().map_err(|_| {
            Error::invalid_parameter(LIMIT_PARAM, format!("'{raw}' is not an integer"))
        })?;

        if requested <= 0 {
            return Ok(self.fallback_limit());
        }
        if requested > i64::from(max_limit) {
            tracing::debug!(requested, max_limit, "Clamping list limit");
            return Ok(max_limit);
        }
        // Bounded by max_limit above
        Ok(requested as u32)
    }

    fn max_limit(&self) -> u32 {
        self.api.max_limit.max(1)
    }

    fn fallback_limit(&self) -> u32 {
        self.api.default_limit.clamp(1, self.max_limit())
    }

    fn collection_path(&self, version: &str, resource: &str) -> String {
        format!(
            "{}/{}/{}",
            self.api.normalized_base_path(),
            urlencoding::encode(version),
            urlencoding::encode(resource)
        )
    }

    fn encoded_response(&self, encoded: Encoded) -> Response {
        match encoded.body {
            Some(body) => {
                let mut response = Response::new(Body::from(body));
                *response.status_mut() = encoded.status;
                if let Ok(content_type) = HeaderValue::from_str(self.codec.content_type()) {
                    response
                        .headers_mut()
                        .insert(header::CONTENT_TYPE, content_type);
                }
                response
            }
            None => encoded.status.into_response(),
        }
    }
}

fn check_version<C: Codec>(handler: &dyn DynResourceHandler<C>, version: &str) -> Result<()> {
    let versions = handler.supported_versions();
    if versions.is_empty() || versions.iter().any(|v| *v == version) {
        return Ok(());
    }
    Err(Error::UnsupportedVersion {
        resource: handler.name().to_string(),
        version: version.to_string(),
    })
}

fn require_id<'a>(request: &DispatchRequest<'a>) -> Result<&'a str> {
    request
        .id
        .ok_or_else(|| Error::invalid_parameter("id", "missing resource id"))
}

fn owned_pairs(ctx: &RequestContext) -> Vec<(String, String)> {
    ctx.query_pairs()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
