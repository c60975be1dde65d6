//! # rest-resource
//!
//! Resource-oriented REST framework. Register a handler per resource name and
//! get versioned, cursor-paginated CRUD endpoints:
//!
//! | Method | Path | Handler method |
//! |--------|------|----------------|
//! | GET | `/api/{version}/{resource}` | `read_list` |
//! | POST | `/api/{version}/{resource}` | `create` |
//! | GET | `/api/{version}/{resource}/{id}` | `read` |
//! | PUT | `/api/{version}/{resource}/{id}` | `update` |
//! | DELETE | `/api/{version}/{resource}/{id}` | `delete` |
//!
//! Operations a handler does not implement answer `405 Method Not Allowed`.
//!
//! ## Features
//!
//! - **Typed handlers**: each handler declares its own resource and input types
//! - **Cursor pagination**: opaque cursors, default and maximum page sizes
//! - **Pluggable codec**: JSON by default
//! - **Middleware stack**: request ids, CORS, compression, timeouts, body limits, panic recovery
//! - **Configuration**: defaults, TOML files and `REST_` environment variables
//! - **Graceful shutdown**: SIGTERM and SIGINT drain in-flight requests
//!
//! ## Example
//!
//! ```rust,no_run
//! use rest_resource::prelude::*;
//!
//! struct Numbers;
//!
//! impl ResourceHandler for Numbers {
//!     type Resource = u64;
//!     type Input = serde::de::IgnoredAny;
//!
//!     fn resource_name(&self) -> &str {
//!         "numbers"
//!     }
//!
//!     async fn read_list(
//!         &self,
//!         _ctx: &RequestContext,
//!         limit: u32,
//!         cursor: &str,
//!         _version: &str,
//!     ) -> std::result::Result<Page<u64>, HandlerError> {
//!         let start: u64 = cursor.parse().unwrap_or(0);
//!         let end = start + u64::from(limit);
//!         Ok(Page::new((start..end).collect(), end.to_string()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let mut api = Api::with_config(config);
//!     api.register_resource_handler(Numbers)?;
//!     api.serve().await
//! }
//! ```

pub mod api;
pub mod codec;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod observability;
pub mod registry;
pub mod server;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::Api;
    pub use crate::codec::{Codec, JsonCodec};
    pub use crate::config::{ApiConfig, Config, MiddlewareConfig, ServiceConfig};
    pub use crate::context::{parse_flag, RequestContext};
    pub use crate::dispatch::{DispatchRequest, Dispatcher};
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::handlers::{
        HandlerError, HandlerErrorKind, ItemResponse, ListResponse, Operation, Page,
        ResourceHandler,
    };
    pub use crate::health::{health, HealthResponse};
    pub use crate::middleware::{sensitive_headers_layer, RequestTracking, SENSITIVE_HEADERS};
    pub use crate::observability::init_tracing;
    pub use crate::registry::{DuplicatePolicy, ResourceRegistry};
    pub use crate::server::{shutdown_signal, Server};
    pub use crate::state::AppState;

    pub use axum::Router;
}
