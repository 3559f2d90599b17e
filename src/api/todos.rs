//! To-do CRUD.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::patch};

use crate::api::AppState;
use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::model::{NewTodo, Todo, TodoPatch};

async fn list_todos(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.db.list_todos(auth.id).await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewTodo>,
) -> Result<Json<Todo>, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title must not be empty."));
    }
    let todo = state.db.insert_todo(auth.id, &body, false).await?;
    Ok(Json(todo))
}

async fn update_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(todo_id): Path<i64>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state
        .db
        .update_todo(todo_id, auth.id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;
    Ok(Json(todo))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{todo_id}", patch(update_todo))
}
