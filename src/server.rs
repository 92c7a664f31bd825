use axum::{
    http::StatusCode,
    response::{Html, Redirect},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::error::DataTableError;
use crate::users::USERS_PATH;

pub struct WebServer {
    host: String,
    port: u16,
}

impl WebServer {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    pub async fn start(&self, state: AppState) -> Result<(), DataTableError> {
        let app = create_router(state);

        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| DataTableError::Error(format!("Invalid address: {}", e)))?;

        println!("datatable server starting on http://{}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DataTableError::Error(format!("Failed to bind to {}: {}", addr, e)))?;

        log::info!("Server ready to handle requests on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_signal().await;
                log::info!("Shutdown signal received");
                println!("\nShutdown signal received - stopping server gracefully...");
            })
            .await
            .map_err(|e| DataTableError::Error(format!("Server error: {}", e)))?;

        log::info!("Server shutdown complete");
        Ok(())
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(USERS_PATH) }))
        .route("/health", get(health_check))
        .route(USERS_PATH, get(api::users::index))
        .with_state(state)
}

async fn health_check() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::OK,
        Html("<h1>datatable</h1><p>Server is running</p>"),
    )
}

/// Waits for a shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received SIGINT (Ctrl+C)");
        },
        _ = terminate => {
            log::info!("Received SIGTERM");
        },
    }
}

/// Serves `state` on an ephemeral local port until the test runtime shuts down.
#[cfg(test)]
pub(crate) async fn serve_ephemeral(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, create_router(state)).await });
    addr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::query::DataTableService;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn router() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("server.db")).unwrap();
        (dir, create_router(AppState::new(db, DataTableService::default())))
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_dir, app) = router();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_redirects_to_users() {
        let (_dir, app) = router();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/users");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (_dir, app) = router();
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
