use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub upload_dir: String,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let upload_dir_ok = tokio::fs::metadata(&state.config.upload_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let response = HealthResponse {
        status: if upload_dir_ok { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        upload_dir: if upload_dir_ok { "available" } else { "missing" }.to_string(),
    };

    let status = if upload_dir_ok {
        StatusCode::OK
    } else {
        tracing::error!(path = %state.config.upload_dir.display(), "Upload directory unavailable");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
