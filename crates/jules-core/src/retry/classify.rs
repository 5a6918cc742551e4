//! Classify HTTP statuses and transport failures into [`ApiError`]s.

use serde_json::Value;

use crate::retry::error::{ApiError, ErrorKind};
use crate::transport::{HttpResponse, TransportError};

/// Correlation headers, in preference order.
const REQUEST_ID_HEADERS: [&str; 3] = [
    "x-request-id",
    "x-google-request-id",
    "x-cloud-trace-context",
];

/// Map an HTTP status code to an error kind.
pub fn classify_http_status(status: u16) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::AuthError,
        400 => ErrorKind::InvalidArgument,
        404 => ErrorKind::NotFound,
        429 => ErrorKind::RateLimited,
        408 | 504 => ErrorKind::Timeout,
        s if s >= 500 => ErrorKind::UpstreamError,
        _ => ErrorKind::Unknown,
    }
}

/// HTTP failures worth another attempt: 429 and any 5xx. Every other 4xx
/// (408 included) ends the call.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Build the error for a non-2xx response whose body was already decoded.
pub fn from_http(response: &HttpResponse, body: &Value) -> ApiError {
    let message = extract_message(body)
        .unwrap_or_else(|| format!("Jules API request failed with HTTP {}.", response.status));
    ApiError::new(classify_http_status(response.status), message)
        .with_status(response.status)
        .with_request_id(request_id(response))
}

/// Map a transport failure into the same error shape as HTTP failures.
pub fn from_transport(error: &TransportError) -> ApiError {
    match error {
        TransportError::TimedOut => {
            ApiError::new(ErrorKind::Timeout, "Jules API request timed out.")
        }
        TransportError::Network(msg) => ApiError::new(ErrorKind::NetworkError, msg.clone()),
    }
}

/// `error.message`, falling back to a top-level `message`.
fn extract_message(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    let source = obj.get("error").and_then(Value::as_object).unwrap_or(obj);
    source
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// First non-empty correlation header.
fn request_id(response: &HttpResponse) -> Option<String> {
    REQUEST_ID_HEADERS
        .iter()
        .filter_map(|name| response.header(name))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, headers: &[(&str, &str)]) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: String::new(),
        }
    }

    #[test]
    fn status_table() {
        assert_eq!(classify_http_status(401), ErrorKind::AuthError);
        assert_eq!(classify_http_status(403), ErrorKind::AuthError);
        assert_eq!(classify_http_status(400), ErrorKind::InvalidArgument);
        assert_eq!(classify_http_status(404), ErrorKind::NotFound);
        assert_eq!(classify_http_status(429), ErrorKind::RateLimited);
        assert_eq!(classify_http_status(408), ErrorKind::Timeout);
        assert_eq!(classify_http_status(504), ErrorKind::Timeout);
        assert_eq!(classify_http_status(500), ErrorKind::UpstreamError);
        assert_eq!(classify_http_status(503), ErrorKind::UpstreamError);
    }

    #[test]
    fn request_timeout_status_is_terminal() {
        let err = from_http(&response(408, &[]), &json!({}));
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.status(), Some(408));
        assert!(!err.retryable());

        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(504));
        assert!(!is_retryable_status(408));
        assert!(!is_retryable_status(409));
    }

    #[test]
    fn unlisted_statuses_are_unknown() {
        assert_eq!(classify_http_status(301), ErrorKind::Unknown);
        assert_eq!(classify_http_status(409), ErrorKind::Unknown);
        assert_eq!(classify_http_status(418), ErrorKind::Unknown);
    }

    #[test]
    fn message_from_nested_error() {
        let body = json!({"error": {"message": "invalid key"}});
        let err = from_http(&response(401, &[]), &body);
        assert_eq!(err.kind(), ErrorKind::AuthError);
        assert_eq!(err.message(), "invalid key");
        assert_eq!(err.status(), Some(401));
        assert!(!err.retryable());
    }

    #[test]
    fn message_from_top_level_or_fallback() {
        let err = from_http(&response(400, &[]), &json!({"message": "bad page size"}));
        assert_eq!(err.message(), "bad page size");

        let err = from_http(&response(502, &[]), &json!({"raw": "<html>"}));
        assert_eq!(err.message(), "Jules API request failed with HTTP 502.");
        assert!(err.retryable());
    }

    #[test]
    fn request_id_prefers_first_non_empty_header() {
        let resp = response(
            500,
            &[
                ("X-Request-Id", " "),
                ("X-Google-Request-Id", "g-42"),
                ("X-Cloud-Trace-Context", "trace"),
            ],
        );
        let err = from_http(&resp, &json!({}));
        assert_eq!(err.request_id(), Some("g-42"));
    }

    #[test]
    fn transport_failures_are_retryable() {
        let timeout = from_transport(&TransportError::TimedOut);
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert!(timeout.retryable());
        assert!(timeout.status().is_none());

        let net = from_transport(&TransportError::Network("connection refused".into()));
        assert_eq!(net.kind(), ErrorKind::NetworkError);
        assert_eq!(net.message(), "connection refused");
        assert!(net.retryable());
    }
}
