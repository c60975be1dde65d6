//! The resource handler contract
//!
//! A handler owns the business logic for one resource name. Every CRUD
//! operation has a default body that reports [`HandlerError::unsupported`], so
//! a handler only writes the operations it serves. Methods use RPITIT
//! (Return Position Impl Trait In Traits), so implementations may simply be
//! written as `async fn`.
//!
//! # Example
//!
//! ```rust
//! use rest_resource::context::{parse_flag, RequestContext};
//! use rest_resource::handlers::{HandlerError, Page, ResourceHandler};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Note {
//!     id: u64,
//!     text: String,
//! }
//!
//! #[derive(Serialize)]
//! #[serde(untagged)]
//! enum NoteView {
//!     Full(Note),
//!     Id(u64),
//! }
//!
//! struct NoteHandler;
//!
//! impl ResourceHandler for NoteHandler {
//!     type Resource = NoteView;
//!     type Input = serde::de::IgnoredAny;
//!
//!     fn resource_name(&self) -> &str {
//!         "notes"
//!     }
//!
//!     async fn read_list(
//!         &self,
//!         ctx: &RequestContext,
//!         _limit: u32,
//!         _cursor: &str,
//!         _version: &str,
//!     ) -> Result<Page<NoteView>, HandlerError> {
//!         let notes = vec![Note { id: 1, text: "hello".into() }];
//!         let ids_only = parse_flag(ctx.value_with_default("ids_only", "0")).unwrap_or(false);
//!         let items = notes
//!             .into_iter()
//!             .map(|n| if ids_only { NoteView::Id(n.id) } else { NoteView::Full(n) })
//!             .collect();
//!         Ok(Page::last(items))
//!     }
//! }
//! ```

use std::future::Future;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::error::{HandlerError, Operation};
use crate::context::RequestContext;

/// One page of a resource collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<R> {
    /// Items in collection order
    pub items: Vec<R>,
    /// Opaque cursor for the following page; empty when the collection is exhausted
    pub next_cursor: String,
}

impl<R> Page<R> {
    /// Page followed by more items reachable through `next_cursor`
    pub fn new(items: Vec<R>, next_cursor: impl Into<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.into(),
        }
    }

    /// Final page of the collection
    pub fn last(items: Vec<R>) -> Self {
        Self::new(items, String::new())
    }

    /// Whether the handler reported another page
    pub fn has_more(&self) -> bool {
        !self.next_cursor.is_empty()
    }

    /// Map every item to another representation, keeping the cursor
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(R) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

/// CRUD handler for a single named resource
///
/// Handlers are constructed once, registered with the API, and shared by every
/// in-flight request. Any interior state must be synchronised by the handler.
///
/// # Type Parameters
///
/// - `Resource`: what the handler returns; anything the codec can serialize,
///   from a bare integer to an untagged enum of several shapes
/// - `Input`: request body accepted by `create` and `update`; read-only
///   handlers use [`serde::de::IgnoredAny`]
pub trait ResourceHandler: Send + Sync + 'static {
    /// Value returned to clients
    type Resource: Serialize + Send;

    /// Body accepted by create and update
    type Input: DeserializeOwned + Send;

    /// Name used in endpoint URLs, i.e. `/api/{version}/{resource_name}`
    fn resource_name(&self) -> &str;

    /// API versions served by this handler; empty means every version
    fn versions(&self) -> &[&'static str] {
        &[]
    }

    /// Read a page of resources, `GET /api/{version}/{resource}`
    ///
    /// `limit` is always positive. `cursor` is whatever this handler returned
    /// as `next_cursor` on a previous call, or empty for the first page.
    fn read_list(
        &self,
        _ctx: &RequestContext,
        _limit: u32,
        _cursor: &str,
        _version: &str,
    ) -> impl Future<Output = Result<Page<Self::Resource>, HandlerError>> + Send {
        async { Err(HandlerError::unsupported(Operation::List)) }
    }

    /// Read a single resource, `GET /api/{version}/{resource}/{id}`
    fn read(
        &self,
        _ctx: &RequestContext,
        _id: &str,
        _version: &str,
    ) -> impl Future<Output = Result<Self::Resource, HandlerError>> + Send {
        async { Err(HandlerError::unsupported(Operation::Read)) }
    }

    /// Create a resource, `POST /api/{version}/{resource}`
    fn create(
        &self,
        _ctx: &RequestContext,
        _input: Self::Input,
        _version: &str,
    ) -> impl Future<Output = Result<Self::Resource, HandlerError>> + Send {
        async { Err(HandlerError::unsupported(Operation::Create)) }
    }

    /// Update a resource, `PUT /api/{version}/{resource}/{id}`
    fn update(
        &self,
        _ctx: &RequestContext,
        _id: &str,
        _input: Self::Input,
        _version: &str,
    ) -> impl Future<Output = Result<Self::Resource, HandlerError>> + Send {
        async { Err(HandlerError::unsupported(Operation::Update)) }
    }

    /// Delete a resource, `DELETE /api/{version}/{resource}/{id}`
    ///
    /// Returning `Some` echoes the deleted resource; `None` yields `204 No Content`.
    fn delete(
        &self,
        _ctx: &RequestContext,
        _id: &str,
        _version: &str,
    ) -> impl Future<Output = Result<Option<Self::Resource>, HandlerError>> + Send {
        async { Err(HandlerError::unsupported(Operation::Delete)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerErrorKind;

    struct ListOnly;

    impl ResourceHandler for ListOnly {
        type Resource = u32;
        type Input = serde::de::IgnoredAny;

        fn resource_name(&self) -> &str {
            "numbers"
        }

        async fn read_list(
            &self,
            _ctx: &RequestContext,
            limit: u32,
            cursor: &str,
            _version: &str,
        ) -> Result<Page<u32>, HandlerError> {
            let start: u32 = cursor.parse().unwrap_or(0);
            let items: Vec<u32> = (start..start + limit).collect();
            Ok(Page::new(items, (start + limit).to_string()))
        }
    }

    #[test]
    fn test_page_helpers() {
        let page = Page::new(vec![1, 2], "abc");
        assert!(page.has_more());
        let last: Page<i32> = Page::last(vec![]);
        assert!(!last.has_more());
        assert_eq!(page.map(|n| n * 10).items, vec![10, 20]);
    }

    #[tokio::test]
    async fn test_implemented_operation() {
        let ctx = RequestContext::default();
        let page = ListOnly.read_list(&ctx, 3, "", "v1").await.unwrap();
        assert_eq!(page.items, vec![0, 1, 2]);
        assert_eq!(page.next_cursor, "3");

        let page = ListOnly.read_list(&ctx, 2, &page.next_cursor, "v1").await.unwrap();
        assert_eq!(page.items, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_default_operations_are_unsupported() {
        let ctx = RequestContext::default();

        let err = ListOnly.read(&ctx, "1", "v1").await.unwrap_err();
        assert_eq!(err.kind, HandlerErrorKind::Unsupported);
        assert_eq!(err.operation, Operation::Read);

        let err = ListOnly
            .create(&ctx, serde::de::IgnoredAny, "v1")
            .await
            .unwrap_err();
        assert_eq!(err.operation, Operation::Create);

        let err = ListOnly
            .update(&ctx, "1", serde::de::IgnoredAny, "v1")
            .await
            .unwrap_err();
        assert_eq!(err.operation, Operation::Update);

        let err = ListOnly.delete(&ctx, "1", "v1").await.unwrap_err();
        assert_eq!(err.operation, Operation::Delete);
    }

    #[test]
    fn test_default_versions_is_unrestricted() {
        assert!(ListOnly.versions().is_empty());
    }
}
