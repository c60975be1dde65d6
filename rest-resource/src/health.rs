//! Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Registered resource names, sorted
    pub resources: Vec<String>,
}

/// Liveness probe
///
/// Always returns 200 OK while the service is running.
pub async fn health<C: Codec>(State(state): State<AppState<C>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: state.config().service.name.clone(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        resources: state
            .dispatcher()
            .registry()
            .names()
            .into_iter()
            .map(str::to_owned)
            .collect(),
    };

    (StatusCode::OK, Json(response))
}
