//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p toolkit-api`.

pub mod fixtures;

use axum_test::TestServer;
use std::sync::Arc;
use tempfile::TempDir;
use toolkit_api::constants;
use toolkit_api::setup::routes;
use toolkit_api::state::AppState;
use toolkit_core::{Config, UploadConfig};

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server and its scratch directories.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: TempDir,
    pub download_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of the files currently in the upload directory, sorted.
    pub fn uploaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Setup test app with default upload policy and renaming enabled.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(UploadConfig::default(), true)
}

pub fn setup_test_app_with(upload: UploadConfig, rename_uploads: bool) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let download_dir = tempfile::tempdir().unwrap();

    let config = Config {
        server_port: 0,
        environment: "test".to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
        download_dir: download_dir.path().to_path_buf(),
        rename_uploads,
        upload,
    };

    let state = Arc::new(AppState::new(config));
    let server = TestServer::new(routes::setup_routes(state)).unwrap();

    TestApp {
        server,
        upload_dir,
        download_dir,
    }
}
