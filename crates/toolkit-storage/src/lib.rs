//! Toolkit Storage Library
//!
//! This crate provides the [`Storage`] trait the upload engine writes through and its
//! local filesystem implementation, plus [`create_dir_if_not_exists`].
//!
//! # File names
//!
//! Storage backends receive bare file names, never paths. Empty names, `.`, `..` and
//! names containing a path separator or NUL are rejected with [`StorageError::InvalidKey`].

pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::{create_dir_if_not_exists, LocalStorage};
pub use traits::{Storage, StorageError, StorageResult};
