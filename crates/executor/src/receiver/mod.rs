use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chrono::Utc;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

use crate::services::execution_service::ExecutionService;

pub mod error;
pub mod handlers;

pub const SERVICE_NAME: &str = "crypto-trading-executor";

pub type SharedService = Arc<ExecutionService>;

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Every response, including wrong methods and panicking handlers, carries a
/// JSON body.
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/health", get(handlers::health).fallback(handlers::method_not_allowed))
        .route("/tv_signal", post(handlers::tv_signal).fallback(handlers::method_not_allowed))
        .route("/status", get(handlers::status).fallback(handlers::method_not_allowed))
        .route("/trades", get(handlers::trades).fallback(handlers::method_not_allowed))
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(handlers::panicked))
        .with_state(service)
}

/// Serves until ctrl-c.
pub async fn serve(addr: SocketAddr, service: SharedService) -> anyhow::Result<()> {
    info!("Listening on http://{}", addr);

    axum::Server::try_bind(&addr)?
        .serve(router(service).into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
