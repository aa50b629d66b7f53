//! Route handlers.
//!
//! Each handler decodes the path and body into typed values, runs exactly one
//! store call on the blocking pool, and maps the outcome to a response.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use log::debug;
use todo_core::{StoreError, Todo, TodoId, TodoStore};

use crate::body::TodoBody;
use crate::error::ApiError;

/// The process-wide store handle, injected as router state.
pub type SharedStore = Arc<dyn TodoStore>;

/// Run a store call on tokio's blocking pool. Store I/O is synchronous and
/// must not stall the async workers.
async fn blocking<T, F>(store: &SharedStore, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn TodoStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    let result = tokio::task::spawn_blocking(move || op(store.as_ref())).await?;
    Ok(result?)
}

fn decode_body(body: Result<Json<TodoBody>, JsonRejection>) -> Result<TodoBody, ApiError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| ApiError::InvalidInput(format!("invalid request body: {}", rejection.body_text())))
}

fn decode_id(raw: String) -> Result<TodoId, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::InvalidInput("missing todo id".to_string()));
    }
    Ok(TodoId::from(raw))
}

/// `GET /todos`
pub async fn list_todos(State(store): State<SharedStore>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = blocking(&store, |s| s.list()).await?;
    Ok(Json(todos))
}

/// `POST /todos`, `POST /todos/create`
pub async fn create_todo(
    State(store): State<SharedStore>,
    body: Result<Json<TodoBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let body = decode_body(body)?;
    let todo = Todo::new(body.title);
    let created = blocking(&store, move |s| s.create(todo)).await?;
    debug!("event=todo_created module=api id={}", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /todos/{id}`
pub async fn update_todo(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    body: Result<Json<TodoBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = decode_id(id)?;
    let body = decode_body(body)?;
    blocking(&store, move |s| s.update(&id, &body.title)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /todos/{id}/complete`
pub async fn toggle_complete(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = decode_id(id)?;
    blocking(&store, move |s| s.toggle_complete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /todos/{id}`
pub async fn delete_todo(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = decode_id(id)?;
    blocking(&store, move |s| s.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /todos/completed`, `DELETE /todos/clear`
pub async fn clear_completed(State(store): State<SharedStore>) -> Result<StatusCode, ApiError> {
    let removed = blocking(&store, |s| s.clear_completed()).await?;
    debug!("event=todos_cleared module=api removed={removed}");
    Ok(StatusCode::NO_CONTENT)
}
