//! todo-api バイナリのエントリポイント

use anyhow::Context;
use infrastructure::{DynamoDbClient, DynamoTodoRepository, InMemoryTodoRepository, TodoRepository};
use shared::{init_tracing, Config, StoreBackend};
use std::sync::Arc;
use todo_api::{app_with_config, AppState, RouterConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env があれば読み込む（なくてもよい）
    dotenv::dotenv().ok();
    init_tracing().map_err(|e| anyhow::anyhow!(e))?;

    let config = Config::from_env().context("failed to load configuration")?;

    // ストアのハンドルは起動時に一度だけ作成してサービスへ注入する
    let repo: Arc<dyn TodoRepository> = match config.store_backend {
        StoreBackend::DynamoDb => {
            let db = DynamoDbClient::new(&config).await;
            Arc::new(DynamoTodoRepository::new(db))
        }
        StoreBackend::Memory => {
            warn!("using in-memory store; data is lost on shutdown");
            Arc::new(InMemoryTodoRepository::new())
        }
    };

    let state = AppState::new(repo, config.tenancy);
    let router = app_with_config(state, &RouterConfig::from(&config));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        tenancy = config.tenancy.as_str(),
        prefix = %config.api_prefix,
        "server starting"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// Ctrl-C / SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
