use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Body, Client, StatusCode, header};
use serde::Deserialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{
    repositories::storage::ObjectUploader,
    value_objects::{storage::ObjectKey, upload_error::UploadError},
};

const UPLOAD_ROUTE: &str = "r2-upload";

#[derive(Clone, Debug)]
pub struct WorkerBindingConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

/// Hands the bytes to a worker that owns the bucket binding and writes on our behalf.
pub struct DelegatedUploader {
    base_url: Url,
    client: Client,
}

/// Body the worker answers with on HTTP 200. Every field is optional so a
/// malformed reply becomes an `InvalidResponse` rather than a decode panic.
#[derive(Debug, Deserialize)]
struct WorkerUploadResponse {
    success: Option<bool>,
    url: Option<String>,
    error: Option<String>,
}

impl DelegatedUploader {
    pub fn new(config: WorkerBindingConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid worker upload url: {}", config.base_url))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build worker upload http client")?;

        Ok(Self { base_url, client })
    }

    pub fn upload_url(&self, key: &ObjectKey) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            UPLOAD_ROUTE,
            key
        )
    }
}

#[async_trait]
impl ObjectUploader for DelegatedUploader {
    async fn put_file(
        &self,
        local_path: &Path,
        key: &ObjectKey,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let file = File::open(local_path).await.map_err(|err| {
            UploadError::io(format!("failed to open {}", local_path.display())).with_source(err)
        })?;
        let size_bytes = file
            .metadata()
            .await
            .map_err(|err| {
                UploadError::io(format!("failed to read metadata for {}", local_path.display()))
                    .with_source(err)
            })?
            .len();

        let upload_url = self.upload_url(key);
        debug!(
            url = %upload_url,
            size_bytes,
            content_type,
            "worker_binding: sending put"
        );

        let response = self
            .client
            .put(&upload_url)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, size_bytes)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if status != StatusCode::OK {
            let message = format!("{} {}", status.as_u16(), body.trim());
            warn!(key = %key, status = status.as_u16(), "worker_binding: upload rejected");
            return Err(UploadError::remote(Some(status.as_u16()), message));
        }

        let url = coerce_response(&body)?;
        info!(key = %key, url = %url, "worker_binding: upload completed");

        Ok(url)
    }

    fn transport_name(&self) -> &'static str {
        "worker_binding"
    }
}

/// Accepts only `{"success": true, "url": "..."}` as an upload; a reported
/// failure keeps the worker's own message.
fn coerce_response(body: &str) -> Result<String, UploadError> {
    let parsed: WorkerUploadResponse = serde_json::from_str(body).map_err(|err| {
        UploadError::invalid_response(format!(
            "worker returned a non-JSON body: {}",
            preview(body)
        ))
        .with_source(err)
    })?;

    match parsed {
        WorkerUploadResponse {
            success: Some(true),
            url: Some(url),
            ..
        } if !url.trim().is_empty() => Ok(url),
        WorkerUploadResponse {
            success: Some(false),
            error,
            ..
        } => Err(UploadError::remote(
            None,
            error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "remote reported failure".to_string()),
        )),
        _ => Err(UploadError::invalid_response(format!(
            "worker response does not match the upload result shape: {}",
            preview(body)
        ))),
    }
}

fn map_reqwest_error(error: reqwest::Error) -> UploadError {
    let message = if error.is_timeout() {
        "worker upload request timed out"
    } else if error.is_connect() {
        "worker upload connection failed"
    } else {
        "worker upload request failed"
    };
    UploadError::transport(message).with_source(error)
}

fn preview(body: &str) -> String {
    body.trim().chars().take(256).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::upload_error::UploadErrorKind;
    use axum::{
        Router,
        body::Bytes,
        extract::{Path as RoutePath, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::put,
    };
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Debug, Clone, Default)]
    struct SeenRequest {
        key: String,
        content_type: String,
        body: Vec<u8>,
    }

    #[derive(Clone)]
    struct FakeWorker {
        status: AxumStatus,
        reply: &'static str,
        seen: Arc<Mutex<Option<SeenRequest>>>,
    }

    async fn handle_upload(
        State(worker): State<FakeWorker>,
        RoutePath(key): RoutePath<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> (AxumStatus, &'static str) {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        *worker.seen.lock().unwrap() = Some(SeenRequest {
            key,
            content_type,
            body: body.to_vec(),
        });
        (worker.status, worker.reply)
    }

    async fn spawn_worker(
        status: AxumStatus,
        reply: &'static str,
    ) -> (DelegatedUploader, Arc<Mutex<Option<SeenRequest>>>) {
        let seen = Arc::new(Mutex::new(None));
        let app = Router::new()
            .route("/r2-upload/*key", put(handle_upload))
            .with_state(FakeWorker {
                status,
                reply,
                seen: Arc::clone(&seen),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let uploader = DelegatedUploader::new(WorkerBindingConfig {
            base_url: format!("http://{}/", addr),
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
        })
        .unwrap();

        (uploader, seen)
    }

    fn sample_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn upload_url_uses_route_and_key() {
        let uploader = DelegatedUploader::new(WorkerBindingConfig {
            base_url: "https://uploads.example.workers.dev/".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
        })
        .unwrap();

        assert_eq!(
            uploader.upload_url(&ObjectKey::new("abc123", "video.mp4")),
            "https://uploads.example.workers.dev/r2-upload/abc123/video.mp4"
        );
    }

    #[tokio::test]
    async fn accepted_upload_returns_worker_url() {
        let (uploader, seen) = spawn_worker(
            AxumStatus::OK,
            r#"{"success":true,"url":"https://cdn.example.com/abc123/video.mp4","error":null}"#,
        )
        .await;
        let file = sample_file(b"frames");

        let url = uploader
            .put_file(file.path(), &ObjectKey::new("abc123", "video.mp4"), "video/mp4")
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example.com/abc123/video.mp4");
        let seen = seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.key, "abc123/video.mp4");
        assert_eq!(seen.content_type, "video/mp4");
        assert_eq!(seen.body, b"frames");
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let (uploader, _seen) = spawn_worker(AxumStatus::INTERNAL_SERVER_ERROR, "boom").await;
        let file = sample_file(b"frames");

        let err = uploader
            .put_file(file.path(), &ObjectKey::new("abc123", "video.mp4"), "video/mp4")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), UploadErrorKind::RemoteError);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "500 boom");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn reported_failure_keeps_worker_message() {
        let (uploader, _seen) = spawn_worker(
            AxumStatus::OK,
            r#"{"success":false,"url":null,"error":"bucket is full"}"#,
        )
        .await;
        let file = sample_file(b"frames");

        let err = uploader
            .put_file(file.path(), &ObjectKey::new("t1", "a.m4a"), "audio/m4a")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), UploadErrorKind::RemoteError);
        assert_eq!(err.to_string(), "bucket is full");
    }

    #[tokio::test]
    async fn non_json_reply_is_invalid_response() {
        let (uploader, _seen) = spawn_worker(AxumStatus::OK, "<html>ok</html>").await;
        let file = sample_file(b"frames");

        let err = uploader
            .put_file(file.path(), &ObjectKey::new("t1", "a.webm"), "video/webm")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), UploadErrorKind::InvalidResponse);
    }

    #[test]
    fn success_without_url_is_invalid_response() {
        let err = coerce_response(r#"{"success":true}"#).unwrap_err();
        assert_eq!(err.kind(), UploadErrorKind::InvalidResponse);

        let err = coerce_response(r#"{"success":false}"#).unwrap_err();
        assert_eq!(err.kind(), UploadErrorKind::RemoteError);
        assert_eq!(err.to_string(), "remote reported failure");
    }

    #[tokio::test]
    async fn unreachable_worker_is_transport_error() {
        let uploader = DelegatedUploader::new(WorkerBindingConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            connect_timeout_secs: 2,
            request_timeout_secs: 5,
        })
        .unwrap();
        let file = sample_file(b"frames");

        let err = uploader
            .put_file(file.path(), &ObjectKey::new("t1", "a.mp4"), "video/mp4")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), UploadErrorKind::TransportError);
        assert!(err.is_retryable());
    }
}
