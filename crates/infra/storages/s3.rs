use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, timeout::TimeoutConfig};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{
        Region, RequestChecksumCalculation, ResponseChecksumValidation,
        StalledStreamProtectionConfig,
    },
    error::{ProvideErrorMetadata, SdkError},
};
use http::Uri;

use crate::domain::value_objects::upload_error::UploadError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(300);
const BODY_PREVIEW_CHARS: usize = 512;

/// Static key pair for an S3-compatible endpoint.
#[derive(Clone)]
pub struct StaticKeys {
    pub access_key: String,
    pub secret_key: String,
}

/// Path-style client for an S3-compatible endpoint such as R2.
///
/// Request checksums are only computed when an operation demands them; R2
/// rejects the aws-chunked trailers the SDK would otherwise send.
pub async fn build_s3_client(endpoint: &str, region: &str, keys: StaticKeys) -> Result<Client> {
    let endpoint = format!("{}/", endpoint.trim_end_matches('/'));
    Uri::from_str(&endpoint).with_context(|| format!("invalid s3 endpoint URL: {endpoint}"))?;

    let region = Region::new(region.to_string());
    let timeouts = TimeoutConfig::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .build();

    let shared_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region.clone())
        .credentials_provider(Credentials::new(
            keys.access_key,
            keys.secret_key,
            None,
            None,
            "r2-static",
        ))
        .timeout_config(timeouts)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
        .endpoint_url(endpoint)
        .region(region)
        .force_path_style(true)
        .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
        .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
        .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
        .build();

    Ok(Client::from_conf(s3_config))
}

/// Maps an SDK failure onto the upload error taxonomy.
///
/// Service errors keep status, error code and a body preview. A request the SDK
/// could not even build is permanent; the other response-less failures are
/// transport errors.
pub fn map_sdk_error<E>(err: SdkError<E>, action: &str, bucket: &str, key: &str) -> UploadError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let target = format!("[bucket={}, key={}]", bucket, key);

    let mapped = match &err {
        SdkError::ServiceError(service_err) => {
            let raw = service_err.raw();
            let status = raw.status().as_u16();
            let mut detail = format!(
                "{} failed (status {}, code {})",
                action,
                status,
                service_err.err().code().unwrap_or("unknown")
            );
            if let Some(message) = service_err.err().message().filter(|m| !m.is_empty()) {
                detail.push_str(&format!(": {}", message));
            }
            detail.push(' ');
            detail.push_str(&target);
            if let Some(body) = raw
                .body()
                .bytes()
                .map(|b| String::from_utf8_lossy(b).trim().to_owned())
                .filter(|b| !b.is_empty())
            {
                let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
                detail.push_str(&format!("; body={}", preview));
            }
            UploadError::remote(Some(status), detail)
        }
        SdkError::ConstructionFailure(_) => {
            UploadError::invalid_request(format!("{} could not be constructed {}", action, target))
        }
        SdkError::TimeoutError(_) => {
            UploadError::transport(format!("{} timed out {}", action, target))
        }
        SdkError::DispatchFailure(_) => {
            UploadError::transport(format!("{} could not be dispatched {}", action, target))
        }
        SdkError::ResponseError(_) => UploadError::transport(format!(
            "{} returned an unreadable response {}",
            action, target
        )),
        _ => UploadError::transport(format!("{} failed {}", action, target)),
    };

    mapped.with_source(err)
}
