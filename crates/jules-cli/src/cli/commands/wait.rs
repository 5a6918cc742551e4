//! `jules wait-for-state`.

use jules_core::api::WaitOptions;
use jules_core::normalize::normalize_session;
use jules_core::{ApiError, JulesClient, TargetStates};
use serde_json::{json, Value};
use std::time::Duration;

pub async fn run_wait_for_state(
    client: &JulesClient,
    session: &str,
    targets: Vec<String>,
    timeout_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
) -> Result<Value, ApiError> {
    let targets = if targets.is_empty() {
        None
    } else {
        Some(TargetStates::new(&targets)?)
    };
    let opts = WaitOptions {
        targets,
        timeout: timeout_ms.map(Duration::from_millis),
        interval: poll_interval_ms.map(Duration::from_millis),
    };

    let outcome = client.wait_for_session_state(session, &opts).await?;
    tracing::info!(
        session,
        state = %outcome.state,
        timed_out = outcome.timed_out,
        attempts = outcome.attempts,
        "wait finished"
    );
    Ok(json!({
        "timedOut": outcome.timed_out,
        "attempts": outcome.attempts,
        "elapsedMs": outcome.elapsed_ms,
        "state": outcome.state,
        "session": normalize_session(&outcome.entity),
        "raw": outcome.entity,
    }))
}
