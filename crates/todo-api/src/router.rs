use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use domain::Tenancy;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::handlers;
use crate::AppState;

/// ToDo ルート（プレフィックス配下にマウントされる）
///
/// シングルテナント構成では `/user/:userId` の代わりに `GET /` が全件を返す。
pub fn todo_routes(tenancy: Tenancy) -> Router<AppState> {
    let router = Router::new()
        .route("/:id", put(handlers::update_todo).delete(handlers::delete_todo))
        .route("/date/:date", get(handlers::list_todos_by_date));

    match tenancy {
        Tenancy::Multi => router
            .route("/", post(handlers::create_todo))
            .route("/user/:user_id", get(handlers::list_user_todos)),
        Tenancy::Single => router.route(
            "/",
            get(handlers::list_all_todos).post(handlers::create_todo),
        ),
    }
}

/// 許可オリジンを限定した CORS レイヤ
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
