//! ToDo HTTP API（axum）
//!
//! 所有者 ID ごとにスコープされた ToDo の CRUD を提供します。
//! 永続化は `infrastructure::TodoRepository` 経由で注入されます。

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod service;

use axum::{routing::get, Router};
use domain::Tenancy;
use infrastructure::TodoRepository;
use std::sync::Arc;

pub use error::ApiError;
pub use service::TodoService;

/// アプリケーションの共有状態
#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,
}

impl AppState {
    pub fn new(repo: Arc<dyn TodoRepository>, tenancy: Tenancy) -> Self {
        Self {
            service: TodoService::new(repo, tenancy),
        }
    }
}

/// ルーティング設定
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub api_prefix: String,
    pub allowed_origins: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            api_prefix: shared::DEFAULT_API_PREFIX.to_string(),
            allowed_origins: shared::DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl From<&shared::Config> for RouterConfig {
    fn from(config: &shared::Config) -> Self {
        Self {
            api_prefix: config.api_prefix.clone(),
            allowed_origins: config.allowed_origins.clone(),
        }
    }
}

/// 既定の設定でルータを構築
pub fn app(state: AppState) -> Router {
    app_with_config(state, &RouterConfig::default())
}

/// ルータを構築して返します。
/// `/health` はプレフィックスに関係なくルート直下に置く。
pub fn app_with_config(state: AppState, config: &RouterConfig) -> Router {
    let todos = router::todo_routes(state.service.tenancy());
    let prefix = config.api_prefix.trim_end_matches('/');

    let router = Router::new().route("/health", get(handlers::health));
    let router = if prefix.is_empty() {
        router.merge(todos)
    } else {
        router.nest(prefix, todos)
    };

    router
        .layer(router::cors_layer(&config.allowed_origins))
        .with_state(state)
}
