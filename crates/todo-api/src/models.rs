use chrono::{DateTime, Utc};
use domain::{NewTodo, Priority, Todo, TodoPatch};
use serde::{Deserialize, Serialize};

/// POST / リクエスト
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub completed: bool,
    /// マルチテナント構成では必須（欠落時は 400）
    #[serde(default)]
    pub user_id: Option<String>,
}

impl CreateTodoRequest {
    pub fn into_parts(self) -> (NewTodo, Option<String>) {
        let new = NewTodo {
            title: self.title,
            category: self.category,
            priority: self.priority,
            completed: self.completed,
        };
        (new, self.user_id)
    }
}

/// PUT /:id リクエスト
///
/// 未知のフィールド（id, createdAt 等）は読み捨てられ、更新対象にならない。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl UpdateTodoRequest {
    pub fn patch(&self) -> TodoPatch {
        TodoPatch {
            title: self.title.clone(),
            category: self.category.clone(),
            priority: self.priority,
            completed: self.completed,
        }
    }
}

/// DELETE /:id リクエスト（シングルテナントでは本文なしも可）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTodoRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// GET /date/:date のクエリ
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateQuery {
    pub user_id: Option<String>,
}

/// ToDo レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: String,
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.as_str().to_string(),
            title: todo.title,
            category: todo.category,
            priority: todo.priority,
            completed: todo.completed,
            user_id: todo.user_id.map(|u| u.as_str().to_string()),
            created_at: todo.created_at,
        }
    }
}

/// 更新/削除の確認メッセージ
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    /// サービスの簡易ステータス
    pub status: &'static str,
}
