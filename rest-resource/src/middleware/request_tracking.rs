//! Request tracking middleware
//!
//! Every request gets an id (reusing the one a client sent), the id is echoed
//! on the response, and credentials are masked before headers reach the logs.

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

use crate::config::MiddlewareConfig;

/// Header used when the configured one is not a valid header name
pub const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

/// Sensitive headers that should be masked in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

/// Generates time-ordered UUIDv7 request ids
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request id layers for a configured header name
#[derive(Debug, Clone)]
pub struct RequestTracking {
    header: HeaderName,
}

impl RequestTracking {
    /// Build from middleware configuration
    pub fn from_config(config: &MiddlewareConfig) -> Self {
        let header = HeaderName::try_from(config.request_id_header.as_str()).unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid request id header '{}', using {}",
                config.request_id_header,
                DEFAULT_REQUEST_ID_HEADER
            );
            HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER)
        });
        Self { header }
    }

    /// Header carrying the request id
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Layer assigning an id to requests that arrive without one
    pub fn id_layer(&self) -> SetRequestIdLayer<MakeRequestUuid> {
        SetRequestIdLayer::new(self.header.clone(), MakeRequestUuid)
    }

    /// Layer copying the request id onto the response
    pub fn propagation_layer(&self) -> PropagateRequestIdLayer {
        PropagateRequestIdLayer::new(self.header.clone())
    }
}

impl Default for RequestTracking {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER),
        }
    }
}

/// Create a sensitive headers layer
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    SetSensitiveRequestHeadersLayer::new(
        SENSITIVE_HEADERS.iter().copied().map(HeaderName::from_static),
    )
}
