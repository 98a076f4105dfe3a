//! Upload result models

use serde::{Deserialize, Serialize};

/// A file part that was fully written to its destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Name sent by the client (basename only).
    pub original_file_name: String,
    /// Name on disk; equals `original_file_name` unless renaming was requested.
    pub new_file_name: String,
    /// Number of bytes written.
    pub file_size: u64,
}

impl UploadedFile {
    pub fn was_renamed(&self) -> bool {
        self.original_file_name != self.new_file_name
    }
}

/// Files written by one multi-file upload, in the order their parts appeared in the body.
pub type UploadResult = Vec<UploadedFile>;
