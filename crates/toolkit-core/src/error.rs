//! Error types module
//!
//! All toolkit operations report failures through [`AppError`]. Each variant
//! self-describes how it should be presented over HTTP via [`ErrorMetadata`], so the
//! API layer only has to render it.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected uploads
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TYPE_NOT_ALLOWED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed multipart body, or the body exceeded the configured ceiling.
    #[error("Failed to parse multipart body: {0}")]
    Parse(String),

    #[error("File type not permitted: {content_type}")]
    TypeNotAllowed { content_type: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Too many files uploaded: expected 1, received {count}")]
    TooManyFiles { count: usize },

    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("Empty string not permitted")]
    EmptyInput,

    #[error("After removing characters, slug is zero length")]
    EmptyResult,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::Parse(_) => (400, "PARSE_ERROR", false, false, LogLevel::Debug),
        AppError::TypeNotAllowed { .. } => {
            (415, "TYPE_NOT_ALLOWED", false, false, LogLevel::Warn)
        }
        AppError::Io(_) => (500, "IO_ERROR", true, true, LogLevel::Error),
        AppError::TooManyFiles { .. } => (400, "TOO_MANY_FILES", false, false, LogLevel::Debug),
        AppError::NoFileUploaded => (400, "NO_FILE_UPLOADED", false, false, LogLevel::Debug),
        AppError::EmptyInput => (400, "EMPTY_INPUT", false, false, LogLevel::Debug),
        AppError::EmptyResult => (400, "EMPTY_RESULT", false, false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
    }
}

impl AppError {
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Parse(_) => "Parse",
            AppError::TypeNotAllowed { .. } => "TypeNotAllowed",
            AppError::Io(_) => "Io",
            AppError::TooManyFiles { .. } => "TooManyFiles",
            AppError::NoFileUploaded => "NoFileUploaded",
            AppError::EmptyInput => "EmptyInput",
            AppError::EmptyResult => "EmptyResult",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
        }
    }

    /// Full message including the source chain, for logs and non-production responses.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Io(_) => "Failed to store file".to_string(),
            AppError::InvalidInput(ref msg) | AppError::NotFound(ref msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
