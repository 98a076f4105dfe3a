//! Route configuration and setup

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(upload_routes())
        .merge(utility_routes())
        // The upload engine enforces its own ceiling while streaming.
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn upload_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/uploads", API_PREFIX),
            post(handlers::file_upload::upload_files),
        )
        .route(
            &format!("{}/uploads/one", API_PREFIX),
            post(handlers::file_upload::upload_file),
        )
        .route(
            &format!("{}/downloads/{{file}}", API_PREFIX),
            get(handlers::file_download::download_file),
        )
}

fn utility_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/slugs", API_PREFIX),
            post(handlers::slug::create_slug),
        )
        .route(
            &format!("{}/tokens", API_PREFIX),
            get(handlers::token::create_token),
        )
}
