use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, info};

use crate::domain::{
    repositories::storage::ObjectUploader,
    value_objects::{storage::ObjectKey, upload_error::UploadError},
};

use super::s3::{StaticKeys, build_s3_client, map_sdk_error};

pub const R2_REGION: &str = "auto";

pub const MISSING_CREDENTIALS_MESSAGE: &str = "R2 credentials not found. Set R2_ACCESS_KEY_ID and R2_SECRET_ACCESS_KEY environment variables.";

#[derive(Clone, Debug)]
pub struct R2StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub public_url_base: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Talks to R2 directly through its S3 API with signed requests.
pub struct DirectUploader {
    client: Option<aws_sdk_s3::Client>,
    bucket: String,
    public_url_base: String,
}

impl DirectUploader {
    /// Without both credentials the uploader is still built, but every upload
    /// fails with `AuthMissing` and never touches the network.
    pub async fn new(config: R2StorageConfig) -> Result<Self> {
        let R2StorageConfig {
            endpoint,
            bucket,
            public_url_base,
            access_key_id,
            secret_access_key,
        } = config;

        let client = match (non_empty(access_key_id), non_empty(secret_access_key)) {
            (Some(access_key), Some(secret_key)) => {
                let keys = StaticKeys {
                    access_key,
                    secret_key,
                };
                let client = build_s3_client(&endpoint, R2_REGION, keys)
                    .await
                    .context("failed to build R2 s3 client")?;
                Some(client)
            }
            _ => None,
        };

        Ok(Self {
            client,
            bucket,
            public_url_base: public_url_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn public_url(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.public_url_base, key)
    }
}

#[async_trait]
impl ObjectUploader for DirectUploader {
    async fn put_file(
        &self,
        local_path: &Path,
        key: &ObjectKey,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| UploadError::auth_missing(MISSING_CREDENTIALS_MESSAGE))?;

        let body = ByteStream::from_path(local_path).await.map_err(|err| {
            UploadError::io(format!("failed to open {}", local_path.display())).with_source(err)
        })?;

        debug!(
            bucket = %self.bucket,
            key = %key,
            content_type,
            "r2_direct: sending put_object"
        );

        client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| map_sdk_error(err, "R2 put_object", &self.bucket, key.as_str()))?;

        info!(bucket = %self.bucket, key = %key, "r2_direct: upload completed");

        Ok(self.public_url(key))
    }

    fn transport_name(&self) -> &'static str {
        "r2_direct"
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
