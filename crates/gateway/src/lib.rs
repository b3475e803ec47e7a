//! # Causerie Gateway
//!
//! The WebSocket front door: a single `/ws` endpoint speaking the JSON
//! command protocol, plus a `/health` probe.

pub mod buckets;
pub mod ws;

use axum::routing::get;
use axum::Router;
use causerie_engine::GenerationEngine;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use buckets::{bucket_conversations, ChatBucket};
pub use ws::{ClientCommand, ServerEvent};

/// Shared state for all gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<GenerationEngine>,
}

/// Build the gateway router.
pub fn router(engine: Arc<GenerationEngine>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(GatewayState { engine })
}

async fn health() -> &'static str {
    "ok"
}

/// Bind and serve until the process is stopped.
pub async fn start(engine: Arc<GenerationEngine>, host: &str, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(host, port, "Gateway listening");
    axum::serve(listener, router(engine)).await
}
