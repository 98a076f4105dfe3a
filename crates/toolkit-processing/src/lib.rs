//! Toolkit Processing Library
//!
//! Multipart upload handling: content sniffing, allow-list validation, file naming and
//! the [`UploadEngine`] that ties them together.

pub mod naming;
pub mod sniff;
pub mod upload;
pub mod validator;

pub use naming::NameStrategy;
pub use sniff::{detect_content_type, ReplayReader};
pub use upload::UploadEngine;
pub use validator::validate_content_type;
