pub mod r2;
pub mod s3;
pub mod worker_binding;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::config_model::{UploadMode, UploaderConfig},
    domain::repositories::storage::ObjectUploader,
};

use r2::DirectUploader;
use worker_binding::DelegatedUploader;

/// Picks the transport once, from the configured mode.
pub async fn build_uploader(
    config: &UploaderConfig,
) -> Result<Arc<dyn ObjectUploader + Send + Sync>> {
    let uploader: Arc<dyn ObjectUploader + Send + Sync> = match config.mode {
        UploadMode::WorkerBinding => Arc::new(
            DelegatedUploader::new(config.worker_binding.clone())
                .context("failed to build worker binding uploader")?,
        ),
        UploadMode::Direct => Arc::new(
            DirectUploader::new(config.r2.clone())
                .await
                .context("failed to build direct R2 uploader")?,
        ),
    };

    info!(
        transport = uploader.transport_name(),
        "storage: uploader selected"
    );

    Ok(uploader)
}
