pub mod mcp;
pub mod middleware;
pub mod state;
pub mod transport;
pub mod types;

use crate::utils::error::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use transport::{handle_health, handle_mcp, handle_not_found, handle_sse, handle_sse_message};

pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    tracing::info!("binding MCP server addr={}", addr);
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🌐 MCP server listening on http://{} (/mcp, /sse)", addr);
    axum::serve(listener, app).await.map_err(|err| {
        tracing::error!("HTTP server terminated unexpectedly addr={} error={}", addr, err);
        crate::utils::error::InstallError::IoError(err)
    })
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/sse", get(handle_sse))
        .route(transport::SSE_MESSAGE_PATH, post(handle_sse_message))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(axum::middleware::from_fn(middleware::correlation_middleware))
        .with_state(state)
}
