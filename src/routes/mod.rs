//! API Routes
//!
//! - `/tools/search_web` - Web search (cached)
//! - `/tools/search_arxiv` - arXiv paper search
//! - `/tools/ask_ai` - Ask the assistant about a result
//! - `/health` - Health check

pub mod ask;
pub mod health;
pub mod search;

use axum::Router;
use tower_http::trace::TraceLayer;
use crate::middleware::cors_layer;
use crate::models::AppState;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(search::router(state.clone()))
        .merge(ask::router(state))
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
