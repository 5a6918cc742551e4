//! Request engine: one logical API operation with timeout, retry and
//! uniform error classification.
//!
//! ```text
//! Operation ──► build_url ──► attempt 1 ──► 2xx ──► parsed JSON
//!                               │
//!                               ▼ failure (status or transport)
//!                           ApiError ──► policy ──► sleep ──► attempt 2 …
//! ```

mod body;
mod target;

pub use body::parse_body;
pub use target::build_url;

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::redact::redact_headers;
use crate::retry::{self, run_with_retry, ApiError, RetryPolicy};
use crate::time::{jitter_seed, Sleeper, TokioSleeper};
use crate::transport::{CurlTransport, HttpRequest, Method, Transport, TransportError};

const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Query parameter value; stringified when the URL is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(s) => f.write_str(s),
            QueryValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Text(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Text(v)
    }
}

impl From<&String> for QueryValue {
    fn from(v: &String) -> Self {
        QueryValue::Text(v.clone())
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        QueryValue::Number(i64::from(v))
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        QueryValue::Number(i64::from(v))
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Number(v)
    }
}

/// Descriptor of one API call. Built once, never mutated by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    method: Method,
    path: String,
    query: Vec<(String, QueryValue)>,
    body: Option<Value>,
}

impl Operation {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a query parameter; `None` is omitted entirely.
    pub fn query<V: Into<QueryValue>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.query.push((key.to_string(), v.into()));
        }
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, QueryValue)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// Executes [`Operation`]s against the configured API.
#[derive(Clone)]
pub struct RequestEngine {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl fmt::Debug for RequestEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestEngine")
            .field("config", &self.config.summary())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RequestEngine {
    /// Engine with the libcurl transport and tokio sleeps.
    pub fn new(config: Arc<ClientConfig>) -> Self {
        let transport = Arc::new(CurlTransport::new());
        Self::with_parts(config, transport, Arc::new(TokioSleeper))
    }

    pub fn with_parts(
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let policy = RetryPolicy::with_max_retries(config.max_retries);
        Self {
            config,
            transport,
            sleeper,
            policy,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op`, retrying transient failures, and return the decoded body.
    pub async fn execute(&self, op: &Operation) -> Result<Value, ApiError> {
        let request = self.build_request(op)?;
        let send = |attempt: u32| {
            let request = request.clone();
            async move { self.attempt(attempt, request).await }
        };
        let sleeper = self.sleeper.as_ref();
        run_with_retry(&self.policy, sleeper, jitter_seed(), send).await
    }

    fn build_request(&self, op: &Operation) -> Result<HttpRequest, ApiError> {
        let url = build_url(&self.config, op)?;
        let mut headers = vec![(API_KEY_HEADER.to_string(), self.config.api_key.clone())];
        let body = match op.body() {
            Some(value) => {
                headers.push(("Content-Type".into(), "application/json".into()));
                Some(value.to_string())
            }
            None => None,
        };
        Ok(HttpRequest {
            method: op.method(),
            url: url.into(),
            headers,
            body,
            timeout: self.config.timeout,
        })
    }

    async fn attempt(&self, attempt: u32, request: HttpRequest) -> Result<Value, ApiError> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            attempt,
            headers = ?redact_headers(&request.headers),
            "sending request"
        );

        let timeout = request.timeout;
        let send = self.transport.send(request);
        let response = match tokio::time::timeout(timeout, send).await {
            Err(_) => return Err(retry::from_transport(&TransportError::TimedOut)),
            Ok(Err(e)) => return Err(retry::from_transport(&e)),
            Ok(Ok(response)) => response,
        };

        let body = parse_body(&response.body);
        if response.is_success() {
            tracing::debug!(status = response.status, attempt, "request succeeded");
            return Ok(body);
        }
        Err(retry::from_http(&response, &body))
    }
}
