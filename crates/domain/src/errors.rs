use thiserror::Error;

/// 値オブジェクト生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),

    #[error("Invalid UserId: {0}")]
    InvalidUserId(String),

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid tenancy mode: {0}")]
    InvalidTenancy(String),
}

/// ToDo サービスの操作エラー
///
/// HTTP 層ではそれぞれ 400 / 404 / 403 / 500 に対応する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Todo not found: {0}")]
    NotFound(String),

    #[error("Unauthorized access")]
    Authorization,

    #[error("Store error: {0}")]
    Store(String),
}

impl From<DomainError> for TodoError {
    fn from(e: DomainError) -> Self {
        TodoError::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_becomes_validation() {
        let err: TodoError = DomainError::InvalidUserId("empty".to_string()).into();
        assert_eq!(
            err,
            TodoError::Validation("Invalid UserId: empty".to_string())
        );
    }
}
