//! libcurl-backed transport.
//!
//! Each request uses a fresh `Easy` handle and runs on tokio's blocking pool,
//! so the async caller suspends instead of blocking its worker thread.

use ::curl::easy::{Easy, List};
use async_trait::async_trait;
use std::str;
use std::time::Duration;

use super::parse::parse_header_lines;
use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Production transport. Redirects are not followed; a 3xx reaches the
/// engine as-is.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Transport for CurlTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let connect_timeout = self.connect_timeout;
        tokio::task::spawn_blocking(move || perform(&request, connect_timeout))
            .await
            .map_err(|e| TransportError::Network(format!("transport task failed: {e}")))?
    }
}

impl From<::curl::Error> for TransportError {
    fn from(e: ::curl::Error) -> Self {
        if e.is_operation_timedout() {
            TransportError::TimedOut
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

/// Runs one transfer in the current thread.
fn perform(
    request: &HttpRequest,
    connect_timeout: Duration,
) -> Result<HttpResponse, TransportError> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = Easy::new();
    easy.url(&request.url)?;
    easy.signal(false)?;
    easy.follow_location(false)?;
    easy.connect_timeout(connect_timeout.min(request.timeout))?;
    easy.timeout(request.timeout)?;

    match request.method {
        Method::Get => easy.get(true)?,
        Method::Post => {
            easy.post(true)?;
            // an empty payload still yields `Content-Length: 0`
            let payload = request.body.as_deref().unwrap_or_default();
            easy.post_fields_copy(payload.as_bytes())?;
        }
    }

    let mut list = List::new();
    for (name, value) in &request.headers {
        list.append(&format!("{}: {}", name.trim(), value.trim()))?;
    }
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(HttpResponse {
        status: u16::try_from(status).unwrap_or(0),
        headers: parse_header_lines(&header_lines),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
