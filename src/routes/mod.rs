//! Route modules for officekit-server

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod documents;
pub mod engine;
pub mod health;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_upload_bytes = state.config().server.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/health", health::router())
        .nest("/api/v1/engine", engine::router())
        .nest("/api/v1/documents", documents::router(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
