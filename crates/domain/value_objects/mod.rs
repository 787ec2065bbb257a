pub mod content_types;
pub mod storage;
pub mod upload_error;
