use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single upload as reported to callers.
///
/// Built through [`UploadResult::uploaded`] or [`UploadResult::failed`] so that
/// `url` is set exactly when `success` is true and `error` exactly when it is false.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResult {
    pub success: bool,
    pub url: Option<String>,
    pub error: Option<String>,
}

impl UploadResult {
    pub fn uploaded(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(error.into()),
        }
    }
}

/// Storage key of an uploaded object: `{task_id}/{filename}`.
///
/// Neither part is sanitized; callers supply path-safe values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(task_id: &str, filename: &str) -> Self {
        Self(format!("{}/{}", task_id, filename))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
