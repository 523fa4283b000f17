use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::error::ApiError;
use crate::models::{
    CreateTodoRequest, DateQuery, DeleteTodoRequest, HealthBody, MessageResponse, TodoResponse,
    UpdateTodoRequest,
};
use crate::AppState;

const FETCH_FAILED: &str = "Failed to fetch todos";
const CREATE_FAILED: &str = "Failed to create todo";
const UPDATE_FAILED: &str = "Failed to update todo";
const DELETE_FAILED: &str = "Failed to delete todo";

fn to_responses(todos: Vec<domain::Todo>) -> Vec<TodoResponse> {
    todos.into_iter().map(TodoResponse::from).collect()
}

/// ヘルスチェック用ハンドラ
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthBody { status: "ok" }))
}

/// GET /user/:userId
pub async fn list_user_todos(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    info!(user_id = %user_id, "list todos");
    let todos = state
        .service
        .list(Some(&user_id))
        .await
        .map_err(|e| ApiError::from_todo(e, FETCH_FAILED))?;
    Ok(Json(to_responses(todos)))
}

/// GET /（シングルテナントのみ）
pub async fn list_all_todos(
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    info!("list all todos");
    let todos = state
        .service
        .list(None)
        .await
        .map_err(|e| ApiError::from_todo(e, FETCH_FAILED))?;
    Ok(Json(to_responses(todos)))
}

/// POST /
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let (new, user_id) = req.into_parts();
    info!(user_id = user_id.as_deref().unwrap_or(""), "create todo");

    let todo = state
        .service
        .create(new, user_id.as_deref())
        .await
        .map_err(|e| ApiError::from_todo(e, CREATE_FAILED))?;
    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

/// PUT /:id
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    info!(todo_id = %id, "update todo");

    state
        .service
        .update(&id, req.user_id.as_deref(), &req.patch())
        .await
        .map_err(|e| ApiError::from_todo(e, UPDATE_FAILED))?;
    Ok(Json(MessageResponse::new("Todo updated successfully")))
}

/// DELETE /:id
///
/// 本文は任意。空の場合は所有者 ID なしとして扱う。
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let req: DeleteTodoRequest = if body.iter().all(u8::is_ascii_whitespace) {
        DeleteTodoRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    info!(todo_id = %id, "delete todo");

    state
        .service
        .delete(&id, req.user_id.as_deref())
        .await
        .map_err(|e| ApiError::from_todo(e, DELETE_FAILED))?;
    Ok(Json(MessageResponse::new("Todo deleted successfully")))
}

/// GET /date/:date?userId=...
pub async fn list_todos_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    let Query(query) = query?;
    info!(date = %date, "list todos by date");

    let todos = state
        .service
        .list_by_date(&date, query.user_id.as_deref())
        .await
        .map_err(|e| ApiError::from_todo(e, FETCH_FAILED))?;
    Ok(Json(to_responses(todos)))
}
