//! Resource handlers: the CRUD contract implemented by applications
//!
//! - [`ResourceHandler`]: the trait a handler implements; every operation
//!   has an "unsupported" default
//! - [`Page`]: a page of results plus the opaque cursor of the next page
//! - [`HandlerError`]: errors reported by handlers, with status mapping
//! - [`ListResponse`] / [`ItemResponse`]: the envelopes written to clients
//! - [`DynResourceHandler`]: the object-safe form stored by the registry
//!
//! # Example
//!
//! ```rust
//! use rest_resource::context::RequestContext;
//! use rest_resource::handlers::{HandlerError, Page, ResourceHandler};
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
//!     async fn read(
//!         &self,
//!         _ctx: &RequestContext,
//!         id: &str,
//!         _version: &str,
//!     ) -> Result<u64, HandlerError> {
//!         id.parse()
//!             .map_err(|_| HandlerError::not_found("numbers", id))
//!     }
//! }
//! ```

mod erased;
mod error;
mod response;
mod traits;

pub use erased::{DynResourceHandler, Encoded, ListCall};
pub use error::{HandlerError, HandlerErrorKind, Operation};
pub use response::{CursorMeta, ItemResponse, ListLinks, ListResponse, NextLink};
pub use traits::{Page, ResourceHandler};
