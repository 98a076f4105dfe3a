use toolkit_core::Config;
use toolkit_processing::UploadEngine;

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub engine: UploadEngine,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let engine = UploadEngine::new(config.upload.clone());
        Self { config, engine }
    }
}
