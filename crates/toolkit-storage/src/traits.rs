//! Storage abstraction trait
//!
//! This module defines the Storage trait that the upload engine persists files through.

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;
use toolkit_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file name: {0}")]
    InvalidKey(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::IoError(e) => AppError::Io(e),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::NotADirectory(msg) => {
                AppError::Io(std::io::Error::other(format!("Not a directory: {}", msg)))
            }
        }
    }
}

/// Destination for uploaded files.
///
/// Implementations write to a single flat namespace (one directory for the local
/// backend). Writing an existing name overwrites it.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write the reader to `filename` until EOF and return the number of bytes written.
    ///
    /// On failure no partial file is left behind under `filename`.
    async fn write_stream(
        &self,
        filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<u64>;
}
