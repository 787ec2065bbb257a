use anyhow::{Context, Result};

use super::config_model::{UploadMode, UploaderConfig};
use crate::infra::storages::{r2::R2StorageConfig, worker_binding::WorkerBindingConfig};

pub const DEFAULT_R2_ENDPOINT_URL: &str =
    "https://5839829ae31cfcc592f0f99a0de95da3.r2.cloudflarestorage.com";
pub const DEFAULT_R2_BUCKET_NAME: &str = "yt-dlp-container";
pub const DEFAULT_WORKER_UPLOAD_URL: &str = "https://yt-dlp-containers.farleythecoder.workers.dev";

pub fn load() -> Result<UploaderConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from an arbitrary variable lookup so it can be fed a map in tests.
pub fn load_from<F>(lookup: F) -> Result<UploaderConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mode = if var("USE_WORKER_R2_BINDING")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        UploadMode::WorkerBinding
    } else {
        UploadMode::Direct
    };

    let endpoint = var("R2_ENDPOINT_URL").unwrap_or_else(|| DEFAULT_R2_ENDPOINT_URL.to_string());
    let bucket = var("R2_BUCKET_NAME").unwrap_or_else(|| DEFAULT_R2_BUCKET_NAME.to_string());
    let public_url_base = var("R2_PUBLIC_URL_BASE").unwrap_or_else(|| {
        format!("{}/{}", endpoint.trim_end_matches('/'), bucket)
    });

    let r2 = R2StorageConfig {
        endpoint,
        bucket,
        public_url_base,
        access_key_id: var("R2_ACCESS_KEY_ID"),
        secret_access_key: var("R2_SECRET_ACCESS_KEY"),
    };

    let worker_binding = WorkerBindingConfig {
        base_url: var("R2_WORKER_UPLOAD_URL")
            .unwrap_or_else(|| DEFAULT_WORKER_UPLOAD_URL.to_string()),
        connect_timeout_secs: 10,
        request_timeout_secs: var("R2_UPLOAD_TIMEOUT_SECS")
            .unwrap_or_else(|| "600".to_string())
            .parse()
            .context("R2_UPLOAD_TIMEOUT_SECS is invalid")?,
    };

    Ok(UploaderConfig {
        mode,
        r2,
        worker_binding,
    })
}
