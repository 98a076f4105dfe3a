//! Static file download with a forced display name

use std::convert::Infallible;
use std::io;
use std::path::Path;

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use toolkit_core::AppError;

/// Serve `directory/internal_file_name` as an attachment named `display_file_name`.
///
/// The browser is told to save the file under the display name and the response always
/// carries `Content-Length`. Conditional and range requests are answered by the file server.
pub async fn download_static_file(
    request: Request,
    directory: impl AsRef<Path>,
    internal_file_name: &str,
    display_file_name: &str,
) -> Result<Response, AppError> {
    if internal_file_name.is_empty()
        || internal_file_name == "."
        || internal_file_name == ".."
        || internal_file_name.contains('/')
        || internal_file_name.contains('\\')
        || internal_file_name.contains('\0')
    {
        return Err(AppError::InvalidInput(format!(
            "'{}' is not a plain file name",
            internal_file_name
        )));
    }

    let path = directory.as_ref().join(internal_file_name);
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => return Err(AppError::NotFound(internal_file_name.to_string())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(internal_file_name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let response = ServeFile::new(&path)
        .oneshot(request)
        .await
        .map_err(|e: Infallible| -> AppError { match e {} })?;
    let mut response = response.map(Body::new);

    if response.status() == StatusCode::OK {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));
    }
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        content_disposition(display_file_name)?,
    );

    tracing::debug!(
        path = %path.display(),
        display_name = %display_file_name,
        size_bytes = metadata.len(),
        status = %response.status(),
        "Serving static file"
    );

    Ok(response)
}

/// Build an `attachment` disposition. Non-ASCII names get an RFC 5987 `filename*`
/// alongside an ASCII fallback.
fn content_disposition(display_file_name: &str) -> Result<HeaderValue, AppError> {
    let fallback: String = display_file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let value = if display_file_name.is_ascii() && !display_file_name.contains(['"', '\\']) {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(display_file_name)
        )
    };

    HeaderValue::from_str(&value)
        .map_err(|e| AppError::InvalidInput(format!("Invalid display file name: {}", e)))
}
