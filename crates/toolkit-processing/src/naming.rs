//! Destination file naming

use std::path::Path;
use toolkit_core::constants::RENAMED_FILE_ID_LENGTH;
use toolkit_core::random_string;

/// How an uploaded file is named on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStrategy {
    /// Keep the client's file name; an existing file with that name is overwritten.
    Preserve,
    /// Random alphanumeric identifier plus the original extension.
    Random,
}

impl NameStrategy {
    pub fn from_rename(rename: bool) -> Self {
        if rename {
            NameStrategy::Random
        } else {
            NameStrategy::Preserve
        }
    }

    /// Name to write `original` under. No filesystem lookups are made, so uniqueness of
    /// random names is probabilistic.
    pub fn destination_name(&self, original: &str) -> String {
        match self {
            NameStrategy::Preserve => original.to_string(),
            NameStrategy::Random => {
                format!("{}{}", random_string(RENAMED_FILE_ID_LENGTH), extension_of(original))
            }
        }
    }
}

/// Last path component of a client-supplied file name.
///
/// Browsers on Windows have been known to send full paths, so both separators count.
pub fn base_name(file_name: &str) -> &str {
    file_name.rsplit(['/', '\\']).next().unwrap_or(file_name)
}

/// Extension including the leading dot, or an empty string.
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}
