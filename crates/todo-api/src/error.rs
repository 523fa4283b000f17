use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::TodoError;
use thiserror::Error;

/// HTTP 層のエラー
///
/// クライアントには `{"error": "..."}` のみを返し、ストア障害の詳細はログにだけ残す。
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Todo not found")]
    NotFound,

    #[error("Unauthorized access")]
    Forbidden,

    #[error("{message}")]
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    /// サービスエラーを変換。`failure` はストア障害時にクライアントへ返す文言
    pub fn from_todo(error: TodoError, failure: &'static str) -> Self {
        match error {
            TodoError::Validation(msg) => ApiError::BadRequest(msg),
            TodoError::NotFound(_) => ApiError::NotFound,
            TodoError::Authorization => ApiError::Forbidden,
            TodoError::Store(source) => ApiError::Internal {
                message: failure,
                detail: source,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { message, detail } => {
                tracing::error!(error = %detail, "{message}");
            }
            other => {
                tracing::info!(status = other.status().as_u16(), error = %other, "request rejected");
            }
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {}", e.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query: {}", e.body_text()))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {e}"))
    }
}
