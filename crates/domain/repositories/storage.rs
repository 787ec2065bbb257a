use std::path::Path;

use async_trait::async_trait;

use crate::domain::value_objects::{storage::ObjectKey, upload_error::UploadError};

/// Transport that stores a local file under a key and reports its public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectUploader {
    async fn put_file(
        &self,
        local_path: &Path,
        key: &ObjectKey,
        content_type: &str,
    ) -> Result<String, UploadError>;

    fn transport_name(&self) -> &'static str;
}
