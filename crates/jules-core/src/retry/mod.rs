//! Error taxonomy, retry policy and the retry loop.
//!
//! Every failure (HTTP status or transport) is classified into an
//! [`ApiError`] first; the policy then decides from the error's
//! retryability whether and when to try again.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify_http_status, from_http, from_transport, is_retryable_status};
pub use error::{ApiError, ErrorKind, ErrorPayload};
pub use policy::{jitter_ms, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
