use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Permission bits for directories created by [`create_dir_if_not_exists`].
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Ensure `path` exists as a directory, creating it and any missing parents.
///
/// Succeeds without touching anything when the directory is already there. Fails with
/// [`StorageError::NotADirectory`] when something other than a directory occupies `path`.
pub async fn create_dir_if_not_exists(path: impl AsRef<Path>) -> StorageResult<()> {
    let path = path.as_ref();

    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => return Err(StorageError::NotADirectory(path.display().to_string())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);

    builder.create(path).await.map_err(|e| {
        StorageError::IoError(io::Error::new(
            e.kind(),
            format!("Failed to create directory {}: {}", path.display(), e),
        ))
    })?;

    tracing::debug!(path = %path.display(), "Created directory");
    Ok(())
}

/// Local filesystem storage rooted at one existing directory
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage writing into `base_path`.
    ///
    /// The directory is not created; callers use [`create_dir_if_not_exists`] first.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        LocalStorage {
            base_path: base_path.into(),
        }
    }

    /// Convert a file name to a path inside the base directory.
    ///
    /// Only bare names are accepted so nothing can resolve outside `base_path`.
    fn key_to_path(&self, filename: &str) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains('\0')
        {
            return Err(StorageError::InvalidKey(format!(
                "'{}' is not a plain file name",
                filename
            )));
        }

        Ok(self.base_path.join(filename))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn write_stream(
        &self,
        filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<u64> {
        let path = self.key_to_path(filename)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::IoError(io::Error::new(
                e.kind(),
                format!("Failed to create file {}: {}", path.display(), e),
            ))
        })?;

        let written = match tokio::io::copy(reader, &mut file).await {
            Ok(n) => file.sync_all().await.map(|_| n),
            Err(e) => Err(e),
        };

        let bytes_copied = match written {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                if let Err(remove_err) = fs::remove_file(&path).await {
                    tracing::warn!(
                        path = %path.display(),
                        error = %remove_err,
                        "Failed to remove partially written file"
                    );
                }
                return Err(StorageError::IoError(io::Error::new(
                    e.kind(),
                    format!("Failed to write file {}: {}", path.display(), e),
                )));
            }
        };

        tracing::info!(
            path = %path.display(),
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(bytes_copied)
    }
}
