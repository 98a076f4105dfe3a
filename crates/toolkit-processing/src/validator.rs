use toolkit_core::{AppError, UploadConfig};

/// Normalize MIME type by stripping parameters (e.g. "text/plain; charset=utf-8" -> "text/plain").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Check a sniffed content type against the configured allow-list.
///
/// An empty allow-list accepts everything. Otherwise the type is accepted when either
/// its exact (lower-cased) form or its parameter-free essence is listed.
pub fn validate_content_type(content_type: &str, config: &UploadConfig) -> Result<(), AppError> {
    if config.accepts_any_type() {
        return Ok(());
    }

    let full = content_type.trim().to_lowercase();
    let essence = normalize_mime_type(content_type);

    if config.allowed_types.contains(&full) || config.allowed_types.contains(&essence) {
        return Ok(());
    }

    Err(AppError::TypeNotAllowed {
        content_type: content_type.to_string(),
    })
}
