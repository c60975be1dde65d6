//! API façade: registration, routing and startup
//!
//! ```rust,no_run
//! use rest_resource::prelude::*;
//!
//! struct Ping;
//!
//! impl ResourceHandler for Ping {
//!     type Resource = &'static str;
//!     type Input = serde::de::IgnoredAny;
//!
//!     fn resource_name(&self) -> &str {
//!         "ping"
//!     }
//!
//!     async fn read(
//!         &self,
//!         _ctx: &RequestContext,
//!         _id: &str,
//!         _version: &str,
//!     ) -> std::result::Result<&'static str, HandlerError> {
//!         Ok("pong")
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut api = Api::new();
//!     api.register_resource_handler(Ping)?;
//!     api.start(":8080").await
//! }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

use crate::codec::{Codec, JsonCodec};
use crate::config::Config;
use crate::context::RequestContext;
use crate::dispatch::{DispatchRequest, Dispatcher};
use crate::error::{Error, Result};
use crate::handlers::{DynResourceHandler, Operation, ResourceHandler};
use crate::health::health;
use crate::middleware::RequestTracking;
use crate::registry::ResourceRegistry;
use crate::server::{self, Server};
use crate::state::AppState;

/// Top-level object tying the registry, dispatch engine and listener together
pub struct Api<C: Codec = JsonCodec> {
    config: Config,
    registry: ResourceRegistry<C>,
    codec: C,
}

impl Api<JsonCodec> {
    /// API with default configuration and the JSON codec
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// API with the given configuration and the JSON codec
    pub fn with_config(config: Config) -> Self {
        Self::with_codec(config, JsonCodec)
    }
}

impl Default for Api<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> Api<C> {
    /// API with the given configuration and codec
    pub fn with_codec(config: Config, codec: C) -> Self {
        let registry = ResourceRegistry::with_policy(config.api.duplicate_policy);
        Self {
            config,
            registry,
            codec,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registered resources
    pub fn registry(&self) -> &ResourceRegistry<C> {
        &self.registry
    }

    /// Register a handler under its resource name
    pub fn register_resource_handler<H>(&mut self, handler: H) -> Result<()>
    where
        H: ResourceHandler,
    {
        self.registry.register(handler)
    }

    /// Register a handler that is shared with other owners
    pub fn register_shared_handler(&mut self, handler: Arc<dyn DynResourceHandler<C>>) -> Result<()> {
        self.registry.register_arc(handler)
    }

    /// Freeze the registry and build the router with its middleware stack
    pub fn router(self) -> Router {
        let server = Server::new(self.config.clone());
        let routes = self.routes();
        server.layer(routes)
    }

    /// Serve on `service.host:service.port` until SIGINT or SIGTERM
    pub async fn serve(self) -> Result<()> {
        let address = self.config.service.listen_address();
        self.start(&address).await
    }

    /// Bind `address` and serve until SIGINT or SIGTERM
    ///
    /// `address` is `host:port` or `:port`. Bind failures are returned as
    /// [`Error::Bind`](crate::error::Error::Bind).
    pub async fn start(self, address: &str) -> Result<()> {
        self.start_with_shutdown(address, server::shutdown_signal())
            .await
    }

    /// Bind `address` and serve until `signal` resolves
    pub async fn start_with_shutdown<F>(self, address: &str, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = server::bind(address).await?;
        self.start_on_listener(listener, signal).await
    }

    /// Serve an already-bound listener until `signal` resolves
    ///
    /// Fails with [`Error::Config`](crate::error::Error::Config) when the API
    /// settings do not pass [`ApiConfig::validate`](crate::config::ApiConfig::validate).
    pub async fn start_on_listener<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.config.api.validate()?;
        tracing::info!(resources = ?self.registry.names(), "Starting resource API");
        let server = Server::new(self.config.clone());
        let app = self.router();
        server.serve(listener, app, signal).await
    }

    fn routes(self) -> Router {
        let base = self.config.api.normalized_base_path().to_string();
        let tracking = RequestTracking::from_config(&self.config.middleware);

        let dispatcher = Dispatcher::new(
            Arc::new(self.registry),
            Arc::new(self.codec),
            self.config.api.clone(),
        );
        let state = AppState::new(dispatcher, self.config, tracking.header().clone());

        Router::new()
            .route("/health", get(health::<C>))
            .route(
                &format!("{base}/{{version}}/{{resource}}"),
                get(list_resources::<C>).post(create_resource::<C>),
            )
            .route(
                &format!("{base}/{{version}}/{{resource}}/{{id}}"),
                get(read_resource::<C>)
                    .put(update_resource::<C>)
                    .delete(delete_resource::<C>),
            )
            .with_state(state)
    }
}

/// Path parameters, or the rejection axum produced for them
type PathParams = std::result::Result<Path<HashMap<String, String>>, PathRejection>;

struct Incoming {
    ctx: RequestContext,
    version: String,
    resource: String,
    id: String,
}

impl Incoming {
    fn new<C: Codec>(
        state: &AppState<C>,
        path: PathParams,
        raw_query: Option<String>,
        headers: HeaderMap,
    ) -> Result<Self> {
        let Path(path) = path.map_err(|rejection| {
            tracing::debug!("Rejected request path: {}", rejection.body_text());
            Error::invalid_parameter("path", rejection.body_text())
        })?;
        let ctx = state.request_context(path, raw_query.as_deref(), headers);
        Ok(Self {
            version: ctx.version().unwrap_or_default().to_string(),
            resource: ctx.resource().unwrap_or_default().to_string(),
            id: ctx.id().unwrap_or_default().to_string(),
            ctx,
        })
    }

    fn collection(&self, operation: Operation) -> DispatchRequest<'_> {
        DispatchRequest::collection(operation, &self.resource, &self.version, &self.ctx)
    }

    fn item(&self, operation: Operation) -> DispatchRequest<'_> {
        DispatchRequest::item(operation, &self.resource, &self.version, &self.id, &self.ctx)
    }
}

async fn list_resources<C: Codec>(
    State(state): State<AppState<C>>,
    path: PathParams,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    match Incoming::new(&state, path, query, headers) {
        Ok(incoming) => {
            state
                .dispatcher()
                .respond(incoming.collection(Operation::List))
                .await
        }
        Err(e) => e.into_response(),
    }
}

async fn create_resource<C: Codec>(
    State(state): State<AppState<C>>,
    path: PathParams,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match Incoming::new(&state, path, query, headers) {
        Ok(incoming) => {
            state
                .dispatcher()
                .respond(incoming.collection(Operation::Create).with_body(&body))
                .await
        }
        Err(e) => e.into_response(),
    }
}

async fn read_resource<C: Codec>(
    State(state): State<AppState<C>>,
    path: PathParams,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    match Incoming::new(&state, path, query, headers) {
        Ok(incoming) => {
            state
                .dispatcher()
                .respond(incoming.item(Operation::Read))
                .await
        }
        Err(e) => e.into_response(),
    }
}

async fn update_resource<C: Codec>(
    State(state): State<AppState<C>>,
    path: PathParams,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match Incoming::new(&state, path, query, headers) {
        Ok(incoming) => {
            state
                .dispatcher()
                .respond(incoming.item(Operation::Update).with_body(&body))
                .await
        }
        Err(e) => e.into_response(),
    }
}

async fn delete_resource<C: Codec>(
    State(state): State<AppState<C>>,
    path: PathParams,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    match Incoming::new(&state, path, query, headers) {
        Ok(incoming) => {
            state
                .dispatcher()
                .respond(incoming.item(Operation::Delete))
                .await
        }
        Err(e) => e.into_response(),
    }
}
