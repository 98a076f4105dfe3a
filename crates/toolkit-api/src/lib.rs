//! Toolkit HTTP service
//!
//! Exposes the upload engine, static downloads, slugs and random tokens over axum.

pub mod constants;
pub mod download;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use download::download_static_file;
