pub mod file_download;
pub mod file_upload;
pub mod health;
pub mod slug;
pub mod token;
