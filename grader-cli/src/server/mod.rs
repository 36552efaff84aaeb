//! HTTP boundary for the review service

mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use grader_core::ReviewService;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
}

pub fn app(state: AppState) -> Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}

/// Serve until ctrl-c
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Review service listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
