use crate::download::download_static_file;
use crate::error::{HttpAppError, ValidatedQuery};
use crate::state::AppState;
use axum::{
    extract::{Path, Request, State},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    /// Name the browser saves the file under; defaults to the stored name.
    pub name: Option<String>,
}

pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
    ValidatedQuery(query): ValidatedQuery<DownloadQuery>,
    request: Request,
) -> Result<Response, HttpAppError> {
    let display_name = query
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| file.clone());

    let response =
        download_static_file(request, &state.config.download_dir, &file, &display_name).await?;
    Ok(response)
}
