use std::error::Error as StdError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    /// The local file does not exist.
    NotFound,
    /// Direct mode without an access key or secret.
    AuthMissing,
    /// The request never produced an HTTP response (connect, timeout, dispatch).
    TransportError,
    /// The remote side answered with a failure.
    RemoteError,
    /// The delegated endpoint answered 200 with a body we could not interpret.
    InvalidResponse,
    /// The local file exists but could not be read, or is not a regular file.
    Io,
    /// The request could not be built from our inputs.
    InvalidRequest,
}

impl UploadErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadErrorKind::NotFound => "not_found",
            UploadErrorKind::AuthMissing => "auth_missing",
            UploadErrorKind::TransportError => "transport_error",
            UploadErrorKind::RemoteError => "remote_error",
            UploadErrorKind::InvalidResponse => "invalid_response",
            UploadErrorKind::Io => "io",
            UploadErrorKind::InvalidRequest => "invalid_request",
        }
    }
}

impl fmt::Display for UploadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct UploadError {
    kind: UploadErrorKind,
    message: String,
    status: Option<u16>,
    source: Option<anyhow::Error>,
}

impl UploadError {
    pub fn new(kind: UploadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(UploadErrorKind::NotFound, message)
    }

    pub fn auth_missing(message: impl Into<String>) -> Self {
        Self::new(UploadErrorKind::AuthMissing, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(UploadErrorKind::TransportError, message)
    }

    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            ..Self::new(UploadErrorKind::RemoteError, message)
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(UploadErrorKind::InvalidResponse, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(UploadErrorKind::Io, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(UploadErrorKind::InvalidRequest, message)
    }

    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> UploadErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Transport failures, and remote failures with status 408, 429 or 5xx.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            UploadErrorKind::TransportError => true,
            UploadErrorKind::RemoteError => self
                .status
                .is_some_and(|status| matches!(status, 408 | 429) || (500..=599).contains(&status)),
            _ => false,
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for UploadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|err| err.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_retry_only_on_transient_statuses() {
        assert!(UploadError::remote(Some(503), "503 unavailable").is_retryable());
        assert!(UploadError::remote(Some(429), "429 slow down").is_retryable());
        assert!(!UploadError::remote(Some(403), "403 denied").is_retryable());
        assert!(!UploadError::remote(None, "remote reported failure").is_retryable());
    }

    #[test]
    fn configuration_failures_are_not_retryable() {
        assert!(!UploadError::auth_missing("no credentials").is_retryable());
        assert!(!UploadError::not_found("gone").is_retryable());
        assert!(UploadError::transport("connection refused").is_retryable());
    }

    #[test]
    fn source_is_exposed() {
        let err = UploadError::io("failed to open file")
            .with_source(std::io::Error::other("permission denied"));
        let source = StdError::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("permission denied"));
    }
}
