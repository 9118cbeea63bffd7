//! HTTP request handlers for the suggestion server.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use task_core::SuggestionRequest;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Successful suggestion response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub configured: bool,
    pub models: Vec<String>
}

/// Generates subtask suggestions for the task in the body.
pub async fn suggest_subtasks(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SuggestionRequest>, JsonRejection>
) -> Result<Json<SuggestResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected suggestion request body");
        ServerError::InvalidBody {
            message: rejection.body_text()
        }
    })?;

    let credential = state.config.upstream.api_key.as_ref();
    let suggestions = state.orchestrator.generate(&request, credential).await?;

    Ok(Json(SuggestResponse {
        suggestions: suggestions.into_inner()
    }))
}

/// Health check endpoint.
///
/// Always 200; `configured` reports whether a credential is present.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        configured: state.is_configured(),
        models: state.orchestrator.models().to_vec()
    })
}

/// Prometheus text exposition of the installed recorder.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled\n".to_string())
    }
}
