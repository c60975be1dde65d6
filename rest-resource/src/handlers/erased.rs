//! Object-safe view of [`ResourceHandler`]
//!
//! Handlers differ in their `Resource` and `Input` types, so the registry
//! cannot store them directly. [`DynResourceHandler`] is implemented for every
//! handler and performs the codec work while the concrete types are still
//! known, leaving the dispatch engine with encoded bodies only.

use axum::http::StatusCode;
use futures::future::{BoxFuture, FutureExt};

use super::error::Operation;
use super::response::{ItemResponse, ListResponse, NextLink};
use super::traits::ResourceHandler;
use crate::codec::Codec;
use crate::context::RequestContext;
use crate::error::{Error, Result};

/// Encoded result of a dispatched operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// Status to answer with
    pub status: StatusCode,
    /// Encoded body; `None` for `204 No Content`
    pub body: Option<Vec<u8>>,
}

impl Encoded {
    /// `200 OK` with a body
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
        }
    }

    /// `201 Created` with a body
    pub fn created(body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Some(body),
        }
    }

    /// `204 No Content`
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }
}

/// Arguments of a list call, resolved by the dispatch engine
#[derive(Debug, Clone, Copy)]
pub struct ListCall<'a> {
    /// Request context
    pub ctx: &'a RequestContext,
    /// Effective page size, always positive
    pub limit: u32,
    /// Cursor as supplied by the client, empty for the first page
    pub cursor: &'a str,
    /// Requested API version
    pub version: &'a str,
    /// Link builder for the following page
    pub link: &'a NextLink,
}

/// Type-erased resource handler bound to a codec
///
/// Implemented for every [`ResourceHandler`]; there is no reason to implement
/// it by hand.
pub trait DynResourceHandler<C: Codec>: Send + Sync {
    /// Registered resource name
    fn name(&self) -> &str;

    /// API versions served; empty means every version
    fn supported_versions(&self) -> &[&'static str];

    /// Run the list operation and encode the page envelope
    fn dispatch_list<'a>(&'a self, codec: &'a C, call: ListCall<'a>)
        -> BoxFuture<'a, Result<Encoded>>;

    /// Run the read operation and encode the item envelope
    fn dispatch_read<'a>(
        &'a self,
        codec: &'a C,
        ctx: &'a RequestContext,
        id: &'a str,
        version: &'a str,
    ) -> BoxFuture<'a, Result<Encoded>>;

    /// Decode the body, run the create operation and encode the result
    fn dispatch_create<'a>(
        &'a self,
        codec: &'a C,
        ctx: &'a RequestContext,
        body: &'a [u8],
        version: &'a str,
    ) -> BoxFuture<'a, Result<Encoded>>;

    /// Decode the body, run the update operation and encode the result
    fn dispatch_update<'a>(
        &'a self,
        codec: &'a C,
        ctx: &'a RequestContext,
        id: &'a str,
        body: &'a [u8],
        version: &'a str,
    ) -> BoxFuture<'a, Result<Encoded>>;

    /// Run the delete operation and encode the result, if any
    fn dispatch_delete<'a>(
        &'a self,
        codec: &'a C,
        ctx: &'a RequestContext,
        id: &'a str,
        version: &'a str,
    ) -> BoxFuture<'a, Result<Encoded>>;
}

fn decode_body<C, T>(codec: &C, body: &[u8]) -> Result<T>
where
    C: Codec,
    T: serde::de::DeserializeOwned,
{
    if body.is_empty() {
        return Err(Error::Deserialization("request body is empty".to_string()));
    }
    codec.decode(body)
}

impl<H, C> DynResourceHandler<C> for H
where
    H: ResourceHandler,
    C: Codec,
{
    fn name(&self) -> &str {
        ResourceHandler::resource_name(self)
    }

    fn supported_versions(&self) -> &[&'static str] {
        ResourceHandler::versions(self)
    }

    fn dispatch_list<'a>(
        &'a self,
        codec: &'a C,
        call: ListCall<'a>,
    ) -> BoxFuture<'a, Result<Encoded>> {
        async move {
            let page = ResourceHandler::read_list(self, call.ctx, call.limit, call.cursor, call.version)
                .await
                .map_err(|e| e.with_operation(Operation::List))?;

            if page.items.len() > call.limit as usize {
                tracing::warn!(
                    resource = ResourceHandler::resource_name(self),
                    limit = call.limit,
                    returned = page.items.len(),
                    "Handler returned more items than the requested limit"
                );
            }

            let response = ListResponse::from_page(page, call.limit, call.cursor, call.link);
            tracing::debug!(
                resource = ResourceHandler::resource_name(self),
                items = response.len(),
                has_more = response.pagination.has_more,
                "List dispatched"
            );
            codec.encode(&response).map(Encoded::ok)
        }
        .boxed()
    }

    fn dispatch_read<'a>(
        &'a self,
        codec: &'a C,
        ctx: &'a RequestContext,
        id: &'a str,
        version: &'a str,
    ) -> BoxFuture<'a, Result<Encoded>> {
        async move {
            let resource = ResourceHandler::read(self, ctx, id, version)
                .await
                .map_err(|e| e.with_operation(Operation::Read))?;
            codec.encode(&ItemResponse::new(resource)).map(Encoded::ok)
        }
        .boxed()
    }

    fn dispatch_create<'a>(
        &'a self,
        codec: &'a C,
        ctx: &'a RequestContext,
        body: &'a [u8],
        version: &'a str,
    ) -> BoxFuture<'a, Result<Encoded>> {
        async move {
            let input: H::Input = decode_body(codec, body)?;
            let resource = ResourceHandler::create(self, ctx, input, version)
                .await
                .map_err(|e| e.with_operation(Operation::Create))?;
            codec.encode(&ItemResponse::new(resource)).map(Encoded::created)
        }
        .boxed()
    }

    fn dispatch_update<'a>(
        &'a self,
        codec: &'a C,
        ctx: &'a RequestContext,
        id: &'a str,
        body: &'a [u8],
        version: &'a str,
    ) -> BoxFuture<'a, Result<Encoded>> {
        async move {
            let input: H::Input = decode_body(codec, body)?;
            let resource = ResourceHandler::update(self, ctx, id, input, version)
                .await
                .map_err(|e| e.with_operation(Operation::Update))?;
            codec.encode(&ItemResponse::new(resource)).map(Encoded::ok)
        }
        .boxed()
    }

    fn dispatch_delete<'a>(
        &'a self,
        codec: &'a C,
        ctx: &'a RequestContext,
        id: &'a str,
        version: &'a str,
    ) -> BoxFuture<'a, Result<Encoded>> {
        async move {
            let deleted = ResourceHandler::delete(self, ctx, id, version)
                .await
                .map_err(|e| e.with_operation(Operation::Delete))?;
            match deleted {
                Some(resource) => codec.encode(&ItemResponse::new(resource)).map(Encoded::ok),
                None => Ok(Encoded::no_content()),
            }
        }
        .boxed()
    }
}
