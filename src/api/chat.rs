//! The counsellor chat endpoint and its history.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;

use crate::api::AppState;
use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::counsellor::ChatResponse;
use crate::model::ChatMessage;

/// Inbound turn. Clients may also send a `role` field; it is ignored, the
/// turn is always attributed to the authenticated user.
#[derive(Deserialize)]
struct ChatRequest {
    content: String,
    #[serde(default)]
    session_id: Option<String>,
}

async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::bad_request("Message must not be empty."));
    }
    let response = state
        .counsellor
        .chat(auth.id, &body.content, body.session_id.as_deref())
        .await?;
    Ok(Json(response))
}

#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    limit: usize,
}

fn default_history_limit() -> usize {
    50
}

async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = state.db.recent_chat(auth.id, query.limit.min(200)).await?;
    Ok(Json(messages))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/counsellor/chat", post(chat))
        .route("/counsellor/history", get(history))
}
