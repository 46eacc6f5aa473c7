use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{CreateTodoRequest, TodoBody, TodoList, UpdateTodoRequest};
use super::repo::{self, Todo};
use crate::auth::extractors::AuthSession;
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/todos", post(create_todo).get(list_todos))
        .route(
            "/todos/:id",
            get(get_todo).delete(delete_todo).patch(update_todo),
        )
}

/// A malformed id must look exactly like a missing one.
fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound)
}

fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Resolve the stored completion pair from the client's `completed` flag:
/// true stamps the current time, anything else clears both fields. The
/// client can never set the timestamp directly.
fn completion_fields(completed: Option<bool>, now_ms: i64) -> (bool, Option<i64>) {
    match completed {
        Some(true) => (true, Some(now_ms)),
        _ => (false, None),
    }
}

#[instrument(skip(state, session, payload))]
async fn create_todo(
    State(state): State<AppState>,
    session: AuthSession,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("text is required".into()));
    }

    let todo = repo::insert(&state.db, session.user.id, text).await?;
    info!(todo_id = %todo.id, creator = %todo.creator, "todo created");
    Ok(Json(todo))
}

#[instrument(skip(state, session))]
async fn list_todos(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<TodoList>, ApiError> {
    let todos = repo::list_by_creator(&state.db, session.user.id).await?;
    Ok(Json(TodoList { todos }))
}

#[instrument(skip(state, session))]
async fn get_todo(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<Json<TodoBody>, ApiError> {
    let id = parse_id(&id)?;
    let todo = repo::find(&state.db, id, session.user.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(TodoBody { todo }))
}

#[instrument(skip(state, session))]
async fn delete_todo(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<Json<TodoBody>, ApiError> {
    let id = parse_id(&id)?;
    let todo = repo::delete(&state.db, id, session.user.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(todo_id = %todo.id, "todo deleted");
    Ok(Json(TodoBody { todo }))
}

#[instrument(skip(state, session, payload))]
async fn update_todo(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<TodoBody>, ApiError> {
    let id = parse_id(&id)?;

    let text = match payload.text.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::Validation("text must be non-empty".into())),
        other => other,
    };
    let (completed, completed_at) = completion_fields(payload.completed, now_ms());

    let todo = repo::update(&state.db, id, session.user.id, text, completed, completed_at)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(TodoBody { todo }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completing_stamps_server_time() {
        let (completed, at) = completion_fields(Some(true), 1_700_000_000_000);
        assert!(completed);
        assert_eq!(at, Some(1_700_000_000_000));
    }

    #[test]
    fn uncompleting_clears_timestamp() {
        let (completed, at) = completion_fields(Some(false), 1_700_000_000_000);
        assert!(!completed);
        assert_eq!(at, None);
    }

    #[test]
    fn absent_flag_forces_not_completed() {
        let (completed, at) = completion_fields(None, 1_700_000_000_000);
        assert!(!completed);
        assert_eq!(at, None);
    }

    #[test]
    fn bad_id_format_is_not_found() {
        assert!(matches!(parse_id("123"), Err(ApiError::NotFound)));
        assert!(parse_id("22222222-2222-2222-2222-222222222222").is_ok());
    }
}
