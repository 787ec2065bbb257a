use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tracing::{error, info};

use crate::{
    domain::{
        repositories::storage::ObjectUploader,
        value_objects::{
            content_types::content_type_for,
            storage::{ObjectKey, UploadResult},
            upload_error::UploadError,
        },
    },
    infra::local_files::cleanup_local_file,
};

/// When the local copy is removed after an upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    Always,
    OnSuccess,
    Never,
}

pub struct UploadFileUseCase {
    uploader: Arc<dyn ObjectUploader + Send + Sync>,
}

impl UploadFileUseCase {
    pub fn new(uploader: Arc<dyn ObjectUploader + Send + Sync>) -> Self {
        Self { uploader }
    }

    /// Uploads `local_path` under `{task_id}/{filename}`, keeping the error kind.
    pub async fn upload_detailed(
        &self,
        local_path: &Path,
        task_id: &str,
        filename: &str,
    ) -> Result<String, UploadError> {
        ensure_regular_file(local_path).await?;

        let key = ObjectKey::new(task_id, filename);
        let content_type = content_type_for(filename);

        info!(
            task_id,
            key = %key,
            content_type,
            transport = self.uploader.transport_name(),
            "upload_file: starting upload"
        );

        self.uploader.put_file(local_path, &key, content_type).await
    }

    /// Same as [`Self::upload_detailed`] but never fails: errors become a failed result.
    pub async fn upload(&self, local_path: &Path, task_id: &str, filename: &str) -> UploadResult {
        match self.upload_detailed(local_path, task_id, filename).await {
            Ok(url) => {
                info!(task_id, url = %url, "upload_file: upload succeeded");
                UploadResult::uploaded(url)
            }
            Err(err) => {
                let message = format!("R2 upload failed: {}", err);
                error!(
                    task_id,
                    filename,
                    kind = %err.kind(),
                    retryable = err.is_retryable(),
                    error = %err,
                    "upload_file: upload failed"
                );
                UploadResult::failed(message)
            }
        }
    }

    pub async fn upload_then_cleanup(
        &self,
        local_path: &Path,
        task_id: &str,
        filename: &str,
        policy: CleanupPolicy,
    ) -> UploadResult {
        let result = self.upload(local_path, task_id, filename).await;

        let remove = match policy {
            CleanupPolicy::Always => true,
            CleanupPolicy::OnSuccess => result.success,
            CleanupPolicy::Never => false,
        };
        if remove {
            cleanup_local_file(local_path).await;
        }

        result
    }
}

/// Missing paths are `NotFound`; directories and other non-files are `Io`.
async fn ensure_regular_file(local_path: &Path) -> Result<(), UploadError> {
    let metadata = match fs::metadata(local_path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(UploadError::not_found(format!(
                "Local file not found: {}",
                local_path.display()
            )));
        }
        Err(err) => {
            return Err(UploadError::io(format!(
                "failed to read metadata for {}",
                local_path.display()
            ))
            .with_source(err));
        }
    };

    if !metadata.is_file() {
        return Err(UploadError::io(format!(
            "Local path is not a regular file: {}",
            local_path.display()
        )));
    }

    Ok(())
}
