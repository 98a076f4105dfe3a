//! Multipart upload handling: parse → sniff → validate → name → store.

pub mod engine;
mod spool;

pub use engine::UploadEngine;
