use crate::error::{HttpAppError, ValidatedQuery};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// Overrides `RENAME_UPLOADS` for this request.
    pub rename: Option<bool>,
}

/// Store every file part of a multipart body in the upload directory.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<UploadQuery>,
    request: Request,
) -> Result<impl IntoResponse, HttpAppError> {
    let rename = query.rename.unwrap_or(state.config.rename_uploads);

    let files = state
        .engine
        .upload_many(request, &state.config.upload_dir, rename)
        .await?;

    tracing::info!(count = files.len(), rename, "Upload completed");

    Ok((StatusCode::CREATED, Json(files)))
}

/// Store exactly one file. Bodies with several file parts are rejected before anything is written.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<UploadQuery>,
    request: Request,
) -> Result<impl IntoResponse, HttpAppError> {
    let rename = query.rename.unwrap_or(state.config.rename_uploads);

    let file = state
        .engine
        .upload_one(request, &state.config.upload_dir, rename)
        .await?;

    tracing::info!(
        original_file_name = %file.original_file_name,
        new_file_name = %file.new_file_name,
        file_size = file.file_size,
        "Upload completed"
    );

    Ok((StatusCode::CREATED, Json(file)))
}
