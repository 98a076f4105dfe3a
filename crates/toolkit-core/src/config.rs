//! Configuration module
//!
//! [`UploadConfig`] is the per-engine upload policy (size ceiling and content-type
//! allow-list). [`Config`] is the process configuration for the HTTP service, loaded
//! from the environment.

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

use crate::constants::DEFAULT_MAX_UPLOAD_SIZE;

const SERVER_PORT: u16 = 3000;
const MAX_UPLOAD_SIZE_MB: u64 = 1024;
const UPLOAD_DIR: &str = "./uploads";
const DOWNLOAD_DIR: &str = "./static";

/// Upload policy applied by the upload engine.
///
/// An empty `allowed_types` set accepts every content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    pub max_upload_size: u64,
    pub allowed_types: BTreeSet<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            allowed_types: BTreeSet::new(),
        }
    }
}

impl UploadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Replace the allow-list. Entries are trimmed and lower-cased; blanks are dropped.
    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_types = types
            .into_iter()
            .filter_map(|t| normalize_type(t.as_ref()))
            .collect();
        self
    }

    pub fn allow_type(mut self, content_type: &str) -> Self {
        if let Some(t) = normalize_type(content_type) {
            self.allowed_types.insert(t);
        }
        self
    }

    pub fn accepts_any_type(&self) -> bool {
        self.allowed_types.is_empty()
    }
}

fn normalize_type(content_type: &str) -> Option<String> {
    let t = content_type.trim().to_lowercase();
    (!t.is_empty()).then_some(t)
}

/// HTTP service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub upload_dir: PathBuf,
    pub download_dir: PathBuf,
    pub rename_uploads: bool,
    pub upload: UploadConfig,
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", port, e))?,
            None => SERVER_PORT,
        };

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let max_upload_size_mb = match lookup("MAX_UPLOAD_SIZE_MB") {
            Some(size) => size
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_UPLOAD_SIZE_MB '{}': {}", size, e))?,
            None => MAX_UPLOAD_SIZE_MB,
        };

        let allowed_types: Vec<String> = lookup("ALLOWED_CONTENT_TYPES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.to_string())
            .collect();

        let rename_uploads = lookup("RENAME_UPLOADS")
            .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(true);

        let config = Config {
            server_port,
            environment,
            upload_dir: PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| UPLOAD_DIR.into())),
            download_dir: PathBuf::from(
                lookup("DOWNLOAD_DIR").unwrap_or_else(|| DOWNLOAD_DIR.into()),
            ),
            rename_uploads,
            upload: UploadConfig::new()
                .with_max_upload_size(max_upload_size_mb.saturating_mul(1024 * 1024))
                .with_allowed_types(allowed_types),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload.max_upload_size == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR cannot be empty"));
        }
        if self.download_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("DOWNLOAD_DIR cannot be empty"));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
