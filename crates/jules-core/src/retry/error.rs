//! Classified API error: the single error shape that leaves the core.

use serde::Serialize;
use std::fmt;

use super::classify::is_retryable_status;

/// High-level classification of a failed call.
///
/// Each kind has a default retryability. Errors built from an HTTP response
/// take theirs from the status instead (see [`ApiError::with_status`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// 401 / 403: credential missing, invalid, or lacking access.
    AuthError,
    /// 400, or input rejected before any request was sent.
    InvalidArgument,
    /// 404.
    NotFound,
    /// 429: server asked us to slow down.
    RateLimited,
    /// 408 / 504, or the attempt hit the local timeout.
    Timeout,
    /// Any other 5xx.
    UpstreamError,
    /// Connection, DNS, or other transport-level failure.
    NetworkError,
    /// Anything else (3xx, unlisted 4xx).
    #[serde(rename = "UNKNOWN_ERROR")]
    Unknown,
}

impl ErrorKind {
    /// Retryability of an error of this kind that carries no HTTP status.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited
                | ErrorKind::Timeout
                | ErrorKind::UpstreamError
                | ErrorKind::NetworkError
        )
    }

    /// Operator-facing remediation hint. Advisory only.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            ErrorKind::AuthError => {
                Some("Verify JULES_API_KEY is valid and has access to Jules API.")
            }
            ErrorKind::InvalidArgument => Some(
                "Check source/session resource names and input fields. When creating a session, \
                 provide a starting branch and use automation mode AUTO_CREATE_PR.",
            ),
            ErrorKind::RateLimited => {
                Some("Slow down requests or increase backoff between polling calls.")
            }
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::AuthError => "auth-error",
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::NotFound => "not-found",
            ErrorKind::RateLimited => "rate-limited",
            ErrorKind::Timeout => "timeout",
            ErrorKind::UpstreamError => "upstream-error",
            ErrorKind::NetworkError => "network-error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every public operation of the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    request_id: Option<String>,
    retryable: bool,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            request_id: None,
            retryable: kind.is_retryable(),
        }
    }

    /// Input rejected locally, before any request was sent.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Attach the HTTP status. Only 429 and 5xx responses stay retryable,
    /// whatever the kind.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self.retryable = is_retryable_status(status);
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn retryable(&self) -> bool {
        self.retryable
    }

    pub fn hint(&self) -> Option<&'static str> {
        self.kind.hint()
    }

    /// Flat, serializable view used by output layers.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.kind,
            message: self.message.clone(),
            status: self.status,
            request_id: self.request_id.clone(),
            retryable: self.retryable(),
            hint: self.hint(),
        }
    }
}

/// Wire shape of an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}
