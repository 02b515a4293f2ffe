// rest/mod.rs — public HTTP surface.
//
// Endpoints:
//   POST /chat     conversation turn
//   GET  /tasks    current task list
//   GET  /health   liveness probe

pub mod routes;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/chat", post(routes::chat::chat))
        .route("/tasks", get(routes::tasks::list_tasks))
        .route("/health", get(routes::health::health))
        // The browser UI is served from a different origin.
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

pub async fn serve(ctx: Arc<AppContext>) -> Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        ctx.config.server.bind_address, ctx.config.server.port
    )
    .parse()?;
    let router = build_router(ctx);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
