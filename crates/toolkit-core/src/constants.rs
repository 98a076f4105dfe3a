//! Shared constants

/// Default ceiling for a single multipart request body (1 GiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// Length of the random identifier used when renaming uploaded files.
pub const RENAMED_FILE_ID_LENGTH: usize = 25;

/// Number of leading bytes inspected when sniffing a file's content type.
pub const SNIFF_LEN: usize = 512;

/// Characters used by [`crate::random_string`].
pub const RANDOM_STRING_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
