//! HTTP surface: router assembly, shared state, and the endpoint modules.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::counsellor::CounsellorService;
use crate::store::Database;

pub mod auth;
pub mod chat;
pub mod error;
pub mod profile;
pub mod todos;
pub mod universities;

pub use auth::AuthKeys;
pub use error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub counsellor: CounsellorService,
    pub auth: AuthKeys,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(profile::routes())
        .merge(universities::routes())
        .merge(todos::routes())
        .merge(chat::routes())
        // Wide-open CORS, same as the frontend expects during development.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
