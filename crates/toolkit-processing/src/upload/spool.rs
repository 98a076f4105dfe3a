//! Multipart parsing.
//!
//! The whole body is read before anything reaches the destination directory: each file
//! part is copied into an anonymous temporary file, and the total body is held to the
//! configured ceiling. A malformed or oversized body therefore fails without touching
//! the destination.

use axum::body::Body;
use axum::http::{header, HeaderMap, Request};
use multer::{Constraints, Multipart, SizeLimit};
use std::io::{self, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use toolkit_core::AppError;

/// A file part buffered to a temporary file, positioned at its first byte.
pub(crate) struct SpooledPart {
    pub field_name: String,
    pub file_name: String,
    pub declared_type: Option<String>,
    pub size: u64,
    pub file: File,
}

/// Parse `request` as `multipart/form-data` and spool every part that carries a file name.
///
/// Parts without a file name (plain form fields) are skipped.
pub(crate) async fn spool_file_parts(
    request: Request<Body>,
    max_upload_size: u64,
) -> Result<Vec<SpooledPart>, AppError> {
    let (parts, body) = request.into_parts();

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Parse("missing Content-Type header".to_string()))?;

    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| AppError::Parse(format!("invalid multipart Content-Type: {}", e)))?;

    if let Some(length) = content_length(&parts.headers) {
        if length > max_upload_size {
            return Err(size_exceeded(max_upload_size));
        }
    }

    let constraints =
        Constraints::new().size_limit(SizeLimit::new().whole_stream(max_upload_size));
    let mut multipart =
        Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    let mut spooled = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(map_multer_error)? {
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let field_name = field.name().unwrap_or_default().to_string();
        let declared_type = field.content_type().map(|m| m.to_string());

        let mut file = File::from_std(tempfile::tempfile()?);
        let mut size = 0u64;

        while let Some(chunk) = field.chunk().await.map_err(map_multer_error)? {
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        file.flush().await?;
        file.seek(SeekFrom::Start(0)).await?;

        spooled.push(SpooledPart {
            field_name,
            file_name,
            declared_type,
            size,
            file,
        });
    }

    Ok(spooled)
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn size_exceeded(limit: u64) -> AppError {
    AppError::Parse(format!(
        "request body exceeds the maximum upload size of {} bytes",
        limit
    ))
}

fn map_multer_error(err: multer::Error) -> AppError {
    match err {
        multer::Error::StreamSizeExceeded { limit } => size_exceeded(limit),
        multer::Error::StreamReadFailed(e) => AppError::Io(io::Error::other(e)),
        other => AppError::Parse(other.to_string()),
    }
}
