//! Toolkit Core Library
//!
//! This crate provides the configuration, error types, models and small text
//! helpers (random strings, slugs) shared across all toolkit components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod random;
pub mod slug;

// Re-export commonly used types
pub use config::{Config, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{UploadResult, UploadedFile};
pub use random::random_string;
pub use slug::slugify;
