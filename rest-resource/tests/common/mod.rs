//! Handlers and request helpers shared by the integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use rest_resource::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceExt;

#[derive(Debug, Clone, Serialize)]
pub struct MyResource {
    pub id: u64,
    pub foobar: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MyResourceView {
    Full(MyResource),
    Id(u64),
}

/// List-only handler with an `ids_only` switch
pub struct MyResourceHandler;

impl ResourceHandler for MyResourceHandler {
    type Resource = MyResourceView;
    type Input = serde::de::IgnoredAny;

    fn resource_name(&self) -> &str {
        "myresource"
    }

    async fn read_list(
        &self,
        ctx: &RequestContext,
        _limit: u32,
        _cursor: &str,
        _version: &str,
    ) -> std::result::Result<Page<MyResourceView>, HandlerError> {
        let resources = vec![
            MyResource {
                id: 1,
                foobar: "hello".to_string(),
            },
            MyResource {
                id: 2,
                foobar: "world".to_string(),
            },
        ];
        let ids_only = parse_flag(ctx.value_with_default("ids_only", "0")).unwrap_or(false);

        Ok(Page::last(
            resources
                .into_iter()
                .map(|r| {
                    if ids_only {
                        MyResourceView::Id(r.id)
                    } else {
                        MyResourceView::Full(r)
                    }
                })
                .collect(),
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct NoteInput {
    pub text: String,
}

/// In-memory CRUD handler served under `v1` only
///
/// The list cursor is the id of the first note of the next page.
#[derive(Default)]
pub struct NotesHandler {
    notes: Mutex<BTreeMap<u64, Note>>,
}

impl NotesHandler {
    pub fn with_notes(count: u64) -> Self {
        let notes = (1..=count)
            .map(|id| {
                (
                    id,
                    Note {
                        id,
                        text: format!("note {id}"),
                    },
                )
            })
            .collect();
        Self {
            notes: Mutex::new(notes),
        }
    }
}

impl ResourceHandler for NotesHandler {
    type Resource = Note;
    type Input = NoteInput;

    fn resource_name(&self) -> &str {
        "notes"
    }

    fn versions(&self) -> &[&'static str] {
        &["v1"]
    }

    async fn read_list(
        &self,
        _ctx: &RequestContext,
        limit: u32,
        cursor: &str,
        _version: &str,
    ) -> std::result::Result<Page<Note>, HandlerError> {
        let start: u64 = if cursor.is_empty() {
            0
        } else {
            cursor
                .parse()
                .map_err(|_| HandlerError::bad_request(format!("bad cursor '{cursor}'")))?
        };

        let notes = self.notes.lock().unwrap();
        let mut remaining = notes.range(start..).map(|(_, n)| n.clone());
        let items: Vec<Note> = remaining.by_ref().take(limit as usize).collect();
        let next = remaining.next().map(|n| n.id.to_string()).unwrap_or_default();
        Ok(Page::new(items, next))
    }

    async fn read(
        &self,
        _ctx: &RequestContext,
        id: &str,
        _version: &str,
    ) -> std::result::Result<Note, HandlerError> {
        let notes = self.notes.lock().unwrap();
        id.parse::<u64>()
            .ok()
            .and_then(|key| notes.get(&key).cloned())
            .ok_or_else(|| HandlerError::not_found("notes", id))
    }

    async fn create(
        &self,
        _ctx: &RequestContext,
        input: NoteInput,
        _version: &str,
    ) -> std::result::Result<Note, HandlerError> {
        if input.text.is_empty() {
            return Err(HandlerError::validation_failed("text must not be empty"));
        }
        let mut notes = self.notes.lock().unwrap();
        let id = notes.keys().next_back().copied().unwrap_or(0) + 1;
        let note = Note {
            id,
            text: input.text,
        };
        notes.insert(id, note.clone());
        Ok(note)
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        id: &str,
        input: NoteInput,
        _version: &str,
    ) -> std::result::Result<Note, HandlerError> {
        let key: u64 = id
            .parse()
            .map_err(|_| HandlerError::not_found("notes", id))?;
        let mut notes = self.notes.lock().unwrap();
        let note = notes
            .get_mut(&key)
            .ok_or_else(|| HandlerError::not_found("notes", id))?;
        note.text = input.text;
        Ok(note.clone())
    }

    async fn delete(
        &self,
        _ctx: &RequestContext,
        id: &str,
        _version: &str,
    ) -> std::result::Result<Option<Note>, HandlerError> {
        let mut notes = self.notes.lock().unwrap();
        id.parse::<u64>()
            .ok()
            .and_then(|key| notes.remove(&key))
            .map(|_| None)
            .ok_or_else(|| HandlerError::not_found("notes", id))
    }
}

/// Router with both test handlers registered
pub fn app() -> Router {
    app_with_config(Config::default())
}

pub fn app_with_config(config: Config) -> Router {
    let mut api = Api::with_config(config);
    api.register_resource_handler(MyResourceHandler).unwrap();
    api.register_resource_handler(NotesHandler::with_notes(5))
        .unwrap();
    api.router()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn with_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
