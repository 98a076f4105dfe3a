use axum::body::Body;
use axum::http::Request;
use std::path::Path;
use toolkit_core::constants::SNIFF_LEN;
use toolkit_core::{AppError, UploadConfig, UploadResult, UploadedFile};
use toolkit_storage::{LocalStorage, Storage};

use super::spool::{spool_file_parts, SpooledPart};
use crate::naming::{base_name, NameStrategy};
use crate::sniff::{detect_content_type, ReplayReader};
use crate::validator::validate_content_type;

/// Persists the file parts of multipart requests.
///
/// Each call runs its parts strictly in body order. The engine holds no state besides
/// its [`UploadConfig`], so one instance can serve concurrent requests.
///
/// A failure part-way through a multi-file request does not remove files already written
/// for earlier parts of the same request.
#[derive(Clone, Debug, Default)]
pub struct UploadEngine {
    config: UploadConfig,
}

impl UploadEngine {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Write every file part of `request` into `destination_dir`, which must exist.
    pub async fn upload_many(
        &self,
        request: Request<Body>,
        destination_dir: impl AsRef<Path>,
        rename: bool,
    ) -> Result<UploadResult, AppError> {
        let storage = LocalStorage::new(destination_dir.as_ref());
        self.upload_many_to(request, &storage, rename).await
    }

    /// Same as [`UploadEngine::upload_many`], writing through any [`Storage`].
    pub async fn upload_many_to(
        &self,
        request: Request<Body>,
        storage: &dyn Storage,
        rename: bool,
    ) -> Result<UploadResult, AppError> {
        let parts = spool_file_parts(request, self.config.max_upload_size).await?;
        self.store_parts(parts, storage, NameStrategy::from_rename(rename))
            .await
    }

    /// Write the single file part of `request` into `destination_dir`.
    ///
    /// Fails with [`AppError::TooManyFiles`] for more than one file part and
    /// [`AppError::NoFileUploaded`] for none; in both cases nothing is written.
    pub async fn upload_one(
        &self,
        request: Request<Body>,
        destination_dir: impl AsRef<Path>,
        rename: bool,
    ) -> Result<UploadedFile, AppError> {
        let storage = LocalStorage::new(destination_dir.as_ref());
        self.upload_one_to(request, &storage, rename).await
    }

    /// Same as [`UploadEngine::upload_one`], writing through any [`Storage`].
    pub async fn upload_one_to(
        &self,
        request: Request<Body>,
        storage: &dyn Storage,
        rename: bool,
    ) -> Result<UploadedFile, AppError> {
        let parts = spool_file_parts(request, self.config.max_upload_size).await?;

        match parts.len() {
            0 => return Err(AppError::NoFileUploaded),
            1 => {}
            count => return Err(AppError::TooManyFiles { count }),
        }

        let mut files = self
            .store_parts(parts, storage, NameStrategy::from_rename(rename))
            .await?;
        files.pop().ok_or(AppError::NoFileUploaded)
    }

    async fn store_parts(
        &self,
        parts: Vec<SpooledPart>,
        storage: &dyn Storage,
        strategy: NameStrategy,
    ) -> Result<UploadResult, AppError> {
        let mut files = Vec::with_capacity(parts.len());

        for part in parts {
            files.push(self.store_part(part, storage, strategy).await?);
        }

        Ok(files)
    }

    async fn store_part(
        &self,
        part: SpooledPart,
        storage: &dyn Storage,
        strategy: NameStrategy,
    ) -> Result<UploadedFile, AppError> {
        let SpooledPart {
            field_name,
            file_name,
            declared_type,
            size,
            file,
        } = part;

        let mut reader = ReplayReader::fill(file, SNIFF_LEN).await?;
        let content_type = detect_content_type(reader.window());

        tracing::debug!(
            field = %field_name,
            file_name = %file_name,
            declared_type = declared_type.as_deref().unwrap_or("none"),
            sniffed_type = %content_type,
            size_bytes = size,
            "Sniffed upload content type"
        );

        if let Err(e) = validate_content_type(&content_type, &self.config) {
            tracing::warn!(
                file_name = %file_name,
                content_type = %content_type,
                "Rejected upload with disallowed content type"
            );
            return Err(e);
        }

        let original_file_name = base_name(&file_name).to_string();
        let new_file_name = strategy.destination_name(&original_file_name);

        let file_size = storage.write_stream(&new_file_name, &mut reader).await?;

        Ok(UploadedFile {
            original_file_name,
            new_file_name,
            file_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::header;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;
    use tokio::io::AsyncRead;
    use toolkit_storage::{StorageError, StorageResult};

    const BOUNDARY: &str = "toolkit-test-boundary";

    /// Minimal valid 1x1 PNG bytes.
    fn minimal_png() -> Vec<u8> {
        vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00,
            0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08,
            0xD7, 0x63, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D,
            0x89, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
        ]
    }

    fn minimal_jpeg() -> Vec<u8> {
        let mut jpeg = vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01,
        ];
        jpeg.extend_from_slice(&[0u8; 600]);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    enum Part<'a> {
        File(&'a str, &'a str, &'a [u8]),
        Text(&'a str, &'a str),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::File(name, file_name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n",
                            name, file_name
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                            name, value
                        )
                        .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        raw_multipart_request(multipart_body(parts))
    }

    fn raw_multipart_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn image_engine() -> UploadEngine {
        UploadEngine::new(UploadConfig::new().with_allowed_types(["image/png", "image/jpeg"]))
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Accepts `succeed_for` writes, then fails every later one.
    struct FlakyStorage {
        inner: LocalStorage,
        succeed_for: usize,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl Storage for FlakyStorage {
        async fn write_stream(
            &self,
            filename: &str,
            reader: &mut (dyn AsyncRead + Send + Unpin),
        ) -> StorageResult<u64> {
            if self.writes.fetch_add(1, Ordering::SeqCst) >= self.succeed_for {
                return Err(StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "permission denied",
                )));
            }
            self.inner.write_stream(filename, reader).await
        }
    }

    #[tokio::test]
    async fn test_upload_png_without_rename() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let request = multipart_request(&[Part::File("file", "cat.png", &png)]);

        let files = image_engine()
            .upload_many(request, dir.path(), false)
            .await
            .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].original_file_name, "cat.png");
        assert_eq!(files[0].new_file_name, "cat.png");
        assert_eq!(files[0].file_size, png.len() as u64);

        let written = std::fs::read(dir.path().join("cat.png")).unwrap();
        assert_eq!(written, png);
    }

    #[tokio::test]
    async fn test_upload_png_with_rename() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let request = multipart_request(&[Part::File("file", "cat.png", &png)]);

        let files = image_engine()
            .upload_many(request, dir.path(), true)
            .await
            .unwrap();

        let file = &files[0];
        assert_eq!(file.original_file_name, "cat.png");
        assert_ne!(file.new_file_name, "cat.png");
        assert!(file.new_file_name.ends_with(".png"));
        assert!(dir.path().join(&file.new_file_name).is_file());
        assert!(!dir.path().join("cat.png").exists());
    }

    #[tokio::test]
    async fn test_disallowed_type_writes_nothing() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let engine = UploadEngine::new(UploadConfig::new().with_allowed_types(["image/jpeg"]));
        let request = multipart_request(&[Part::File("file", "cat.png", &png)]);

        let result = engine.upload_many(request, dir.path(), false).await;

        match result {
            Err(AppError::TypeNotAllowed { content_type }) => assert_eq!(content_type, "image/png"),
            other => panic!("Expected TypeNotAllowed, got {:?}", other),
        }
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_declared_type_is_ignored() {
        let dir = tempdir().unwrap();
        // Text posing as a JPEG by name.
        let request = multipart_request(&[Part::File("file", "photo.jpg", b"not an image")]);

        let result = image_engine().upload_many(request, dir.path(), false).await;

        assert!(matches!(result, Err(AppError::TypeNotAllowed { .. })));
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_upload_many_keeps_body_order_and_skips_fields() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let jpeg = minimal_jpeg();
        let request = multipart_request(&[
            Part::Text("title", "holiday"),
            Part::File("first", "b.png", &png),
            Part::Text("note", "ignored"),
            Part::File("second", "a.jpg", &jpeg),
        ]);

        let files = image_engine()
            .upload_many(request, dir.path(), false)
            .await
            .unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.new_file_name.as_str()).collect();
        assert_eq!(names, vec!["b.png", "a.jpg"]);
        assert_eq!(files[1].file_size, jpeg.len() as u64);
        assert_eq!(dir_entries(dir.path()), vec!["a.jpg", "b.png"]);
    }

    #[tokio::test]
    async fn test_large_file_survives_sniffing() {
        let dir = tempdir().unwrap();
        let mut png = minimal_png();
        png.extend((0..100_000u32).map(|i| (i % 253) as u8));
        let request = multipart_request(&[Part::File("file", "big.png", &png)]);

        let files = image_engine()
            .upload_many(request, dir.path(), false)
            .await
            .unwrap();

        assert_eq!(files[0].file_size, png.len() as u64);
        assert_eq!(std::fs::read(dir.path().join("big.png")).unwrap(), png);
    }

    #[tokio::test]
    async fn test_client_path_is_stripped() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let request = multipart_request(&[Part::File("file", "../../escape.png", &png)]);

        let files = image_engine()
            .upload_many(request, dir.path(), false)
            .await
            .unwrap();

        assert_eq!(files[0].original_file_name, "escape.png");
        assert!(dir.path().join("escape.png").is_file());
    }

    #[tokio::test]
    async fn test_empty_allow_list_accepts_any_type() {
        let dir = tempdir().unwrap();
        let request = multipart_request(&[Part::File("file", "notes.txt", b"plain text")]);

        let files = UploadEngine::default()
            .upload_many(request, dir.path(), false)
            .await
            .unwrap();

        assert_eq!(files[0].file_size, 10);
    }

    #[tokio::test]
    async fn test_later_rejection_keeps_earlier_files() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let request = multipart_request(&[
            Part::File("file", "ok.png", &png),
            Part::File("file", "bad.txt", b"plain text"),
        ]);

        let result = image_engine().upload_many(request, dir.path(), false).await;

        assert!(matches!(result, Err(AppError::TypeNotAllowed { .. })));
        assert_eq!(dir_entries(dir.path()), vec!["ok.png"]);
    }

    #[tokio::test]
    async fn test_write_failure_aborts_remaining_parts() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let storage = FlakyStorage {
            inner: LocalStorage::new(dir.path()),
            succeed_for: 1,
            writes: AtomicUsize::new(0),
        };
        let request = multipart_request(&[
            Part::File("file", "one.png", &png),
            Part::File("file", "two.png", &png),
            Part::File("file", "three.png", &png),
        ]);

        let result = image_engine().upload_many_to(request, &storage, false).await;

        match result {
            Err(AppError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            other => panic!("Expected Io error, got {:?}", other),
        }
        assert_eq!(storage.writes.load(Ordering::SeqCst), 2);
        assert_eq!(dir_entries(dir.path()), vec!["one.png"]);
    }

    #[tokio::test]
    async fn test_missing_destination_is_io_error() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let request = multipart_request(&[Part::File("file", "cat.png", &png)]);

        let result = image_engine()
            .upload_many(request, dir.path().join("missing"), false)
            .await;

        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[tokio::test]
    async fn test_body_over_ceiling_is_parse_error() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let engine = UploadEngine::new(UploadConfig::new().with_max_upload_size(64));

        // Without Content-Length the streaming limit applies.
        let request = multipart_request(&[Part::File("file", "cat.png", &png)]);
        let result = engine.upload_many(request, dir.path(), false).await;
        assert!(matches!(result, Err(AppError::Parse(_))));

        // With Content-Length the request is refused before reading.
        let body = multipart_body(&[Part::File("file", "cat.png", &png)]);
        let request = Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();
        let result = engine.upload_many(request, dir.path(), false).await;
        assert!(matches!(result, Err(AppError::Parse(_))));

        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_non_multipart_is_parse_error() {
        let dir = tempdir().unwrap();

        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let result = image_engine().upload_many(request, dir.path(), false).await;
        assert!(matches!(result, Err(AppError::Parse(_))));

        let request = Request::builder()
            .method("POST")
            .body(Body::from("{}"))
            .unwrap();
        let result = image_engine().upload_many(request, dir.path(), false).await;
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn test_truncated_body_is_parse_error() {
        let dir = tempdir().unwrap();
        let png = minimal_png();

        // Complete first part, then a second part cut off before its closing boundary.
        let mut body = multipart_body(&[Part::File("file", "first.png", &png)]);
        let closing = format!("--{}--\r\n", BOUNDARY);
        body.truncate(body.len() - closing.len());
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"second.png\"\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(&png[..20]);

        let result = image_engine()
            .upload_many(raw_multipart_request(body), dir.path(), false)
            .await;

        assert!(matches!(result, Err(AppError::Parse(_))), "{result:?}");
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let dir = tempdir().unwrap();

        let body = b"this body never mentions the boundary".to_vec();
        let result = image_engine()
            .upload_many(raw_multipart_request(body), dir.path(), false)
            .await;

        assert!(matches!(result, Err(AppError::Parse(_))), "{result:?}");
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_only_plain_fields_uploads_nothing() {
        let dir = tempdir().unwrap();
        let request = multipart_request(&[
            Part::Text("title", "holiday"),
            Part::Text("tags", "beach,sun"),
        ]);

        let files = image_engine()
            .upload_many(request, dir.path(), false)
            .await
            .unwrap();

        assert!(files.is_empty());
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_double_dot_in_name_is_preserved() {
        let dir = tempdir().unwrap();
        let request = multipart_request(&[Part::File("file", "a..b.txt", b"plain notes")]);

        let files = UploadEngine::default()
            .upload_many(request, dir.path(), false)
            .await
            .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].original_file_name, "a..b.txt");
        assert_eq!(files[0].new_file_name, "a..b.txt");
        assert_eq!(
            std::fs::read(dir.path().join("a..b.txt")).unwrap(),
            b"plain notes"
        );
    }

    #[tokio::test]
    async fn test_upload_one_single_file() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let request = multipart_request(&[
            Part::Text("caption", "a cat"),
            Part::File("file", "cat.png", &png),
        ]);

        let file = image_engine()
            .upload_one(request, dir.path(), true)
            .await
            .unwrap();

        assert_eq!(file.original_file_name, "cat.png");
        assert!(file.was_renamed());
        assert!(dir.path().join(&file.new_file_name).is_file());
    }

    #[tokio::test]
    async fn test_upload_one_rejects_multiple_files() {
        let dir = tempdir().unwrap();
        let png = minimal_png();
        let request = multipart_request(&[
            Part::File("file", "one.png", &png),
            Part::File("file", "two.png", &png),
        ]);

        let result = image_engine().upload_one(request, dir.path(), false).await;

        assert!(matches!(result, Err(AppError::TooManyFiles { count: 2 })));
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_upload_one_rejects_no_files() {
        let dir = tempdir().unwrap();
        let request = multipart_request(&[Part::Text("caption", "no attachment")]);

        let result = image_engine().upload_one(request, dir.path(), false).await;

        assert!(matches!(result, Err(AppError::NoFileUploaded)));
    }

    #[tokio::test]
    async fn test_upload_one_propagates_type_error() {
        let dir = tempdir().unwrap();
        let request = multipart_request(&[Part::File("file", "notes.txt", b"plain text")]);

        let result = image_engine().upload_one(request, dir.path(), false).await;

        assert!(matches!(result, Err(AppError::TypeNotAllowed { .. })));
    }
}
