//! IDs-only list endpoint
//!
//! This example demonstrates:
//! - A handler that implements only `read_list`; every other operation answers 405
//! - A handler-defined query parameter (`ids_only`) switching the item shape
//! - Configuration loading and tracing initialization
//!
//! Run with: cargo run --example ids-only
//!
//! Test with:
//!   curl http://localhost:8080/api/v1/myresource
//!   curl 'http://localhost:8080/api/v1/myresource?ids_only=true&limit=10'
//!   curl -X DELETE http://localhost:8080/api/v1/myresource/1

use rest_resource::prelude::*;
use serde::Serialize;

/// Domain model served by the endpoint
#[derive(Debug, Clone, Serialize)]
struct MyResource {
    id: u64,
    foobar: String,
}

/// Either a full record or just its id
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MyResourceView {
    Full(MyResource),
    Id(u64),
}

struct MyResourceHandler;

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
        // A real handler would query a store here
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

        // Unparseable values count as false
        let ids_only = parse_flag(ctx.value_with_default("ids_only", "0")).unwrap_or(false);

        let items = resources
            .into_iter()
            .map(|r| {
                if ids_only {
                    MyResourceView::Id(r.id)
                } else {
                    MyResourceView::Full(r)
                }
            })
            .collect();

        Ok(Page::last(items))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_for_service("ids-only")?;
    init_tracing(&config)?;

    let mut api = Api::with_config(config);
    api.register_resource_handler(MyResourceHandler)?;

    api.start(":8080").await
}
