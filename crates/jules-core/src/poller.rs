//! State poller: fetch an entity repeatedly until its `state` field reaches
//! one of a target set or a deadline passes.
//!
//! A deadline is a normal outcome (`timed_out = true`), never an error.
//! Errors from the fetch function are returned unchanged; retrying them is the
//! request engine's job.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use crate::retry::ApiError;
use crate::time::{Clock, Sleeper};

/// Label used when an entity has no usable `state` field.
pub const UNKNOWN_STATE: &str = "UNKNOWN";

/// Non-empty, uppercase set of state labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStates(BTreeSet<String>);

impl TargetStates {
    pub fn new<I, S>(states: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = states
            .into_iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if set.is_empty() {
            return Err(ApiError::invalid_argument(
                "targetStates must contain at least one state",
            ));
        }
        Ok(Self(set))
    }

    /// Terminal session states: `COMPLETED`, `FAILED`, `CANCELLED`.
    pub fn terminal() -> Self {
        Self(
            ["COMPLETED", "FAILED", "CANCELLED"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, state: &str) -> bool {
        self.0.contains(&state.to_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Result of one [`await_state`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOutcome {
    pub timed_out: bool,
    pub attempts: u32,
    pub elapsed_ms: u64,
    /// Last observed state, uppercase.
    pub state: String,
    /// Last fetched entity.
    #[serde(skip)]
    pub entity: Value,
}

/// Uppercased `state` field, or [`UNKNOWN_STATE`] when missing, non-string
/// or blank.
pub fn normalize_state(entity: &Value) -> String {
    entity
        .get("state")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| UNKNOWN_STATE.to_string())
}

/// Poll `fetch` until its state is in `targets` or `timeout` has elapsed.
///
/// At least one fetch always happens, even with a zero timeout. The deadline
/// is checked after each fetch; between fetches the poller sleeps
/// `interval` through `sleeper`.
pub async fn await_state<F, Fut, E>(
    mut fetch: F,
    targets: &TargetStates,
    timeout: Duration,
    interval: Duration,
    clock: &dyn Clock,
    sleeper: &dyn Sleeper,
) -> Result<PollOutcome, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value, E>>,
{
    let started_at = clock.now_ms();
    let timeout_ms = timeout.as_millis() as u64;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let entity = fetch().await?;
        let state = normalize_state(&entity);
        let elapsed_ms = clock.now_ms().saturating_sub(started_at);

        let converged = targets.contains(&state);
        if converged || elapsed_ms >= timeout_ms {
            tracing::debug!(attempts, elapsed_ms, state = %state, converged, "poll finished");
            return Ok(PollOutcome {
                timed_out: !converged,
                attempts,
                elapsed_ms,
                state,
                entity,
            });
        }

        tracing::trace!(attempts, elapsed_ms, state = %state, "state not reached, sleeping");
        sleeper.sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::ErrorKind;
    use crate::testing::{ManualClock, RecordingSleeper};
    use crate::time::{MonotonicClock, TokioSleeper};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn session(state: &str) -> Value {
        json!({"name": "sessions/123", "state": state})
    }

    fn targets(states: &[&str]) -> TargetStates {
        TargetStates::new(states.iter().copied()).unwrap()
    }

    #[test]
    fn target_states_reject_empty() {
        let err = TargetStates::new(Vec::<String>::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(TargetStates::new(["  "]).is_err());
    }

    #[test]
    fn target_states_are_case_insensitive() {
        let t = targets(&["completed", "Failed"]);
        assert!(t.contains("COMPLETED"));
        assert!(t.contains("failed"));
        assert!(!t.contains("RUNNING"));
        assert_eq!(t.iter().collect::<Vec<_>>(), vec!["COMPLETED", "FAILED"]);
    }

    #[test]
    fn normalize_handles_missing_and_non_string() {
        let entity = json!({"state": "in_progress"});
        assert_eq!(normalize_state(&entity), "IN_PROGRESS");
        assert_eq!(normalize_state(&json!({})), UNKNOWN_STATE);
        assert_eq!(normalize_state(&json!({"state": 3})), UNKNOWN_STATE);
        assert_eq!(normalize_state(&json!({"state": ""})), UNKNOWN_STATE);
        assert_eq!(normalize_state(&json!("COMPLETED")), UNKNOWN_STATE);
    }

    #[tokio::test]
    async fn zero_timeout_still_fetches_once() {
        let clock = ManualClock::new();
        let sleeper = RecordingSleeper::driving(clock.clone());
        let calls = AtomicU32::new(0);
        let out = await_state(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ApiError>(session("RUNNING")) }
            },
            &targets(&["COMPLETED"]),
            Duration::ZERO,
            Duration::from_millis(100),
            clock.as_ref(),
            sleeper.as_ref(),
        )
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(out.timed_out);
        assert_eq!(out.attempts, 1);
        assert_eq!(out.state, "RUNNING");
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn returns_as_soon_as_target_matches() {
        let clock = ManualClock::new();
        let sleeper = RecordingSleeper::driving(clock.clone());
        let calls = AtomicU32::new(0);
        let out = await_state(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                let state = if n >= 3 { "completed" } else { "RUNNING" };
                async move { Ok::<_, ApiError>(session(state)) }
            },
            &targets(&["COMPLETED"]),
            Duration::from_secs(60),
            Duration::from_millis(500),
            clock.as_ref(),
            sleeper.as_ref(),
        )
        .await
        .unwrap();
        assert!(!out.timed_out);
        assert_eq!(out.state, "COMPLETED");
        assert_eq!(out.attempts, 3);
        assert_eq!(out.elapsed_ms, 1_000);
        assert_eq!(out.entity["name"], "sessions/123");
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(500); 2]);
    }

    #[tokio::test]
    async fn times_out_with_last_state() {
        let clock = ManualClock::new();
        let sleeper = RecordingSleeper::driving(clock.clone());
        let out = await_state(
            || async { Ok::<_, ApiError>(session("RUNNING")) },
            &targets(&["COMPLETED"]),
            Duration::from_millis(1_000),
            Duration::from_millis(300),
            clock.as_ref(),
            sleeper.as_ref(),
        )
        .await
        .unwrap();
        assert!(out.timed_out);
        assert_eq!(out.state, "RUNNING");
        // fetches at t=0, 300, 600, 900, 1200
        assert_eq!(out.attempts, 5);
        assert_eq!(out.elapsed_ms, 1_200);
    }

    #[tokio::test]
    async fn unknown_state_never_matches_by_accident() {
        let clock = ManualClock::new();
        let sleeper = RecordingSleeper::driving(clock.clone());
        let out = await_state(
            || async { Ok::<_, ApiError>(json!({"name": "sessions/1"})) },
            &TargetStates::terminal(),
            Duration::from_millis(200),
            Duration::from_millis(100),
            clock.as_ref(),
            sleeper.as_ref(),
        )
        .await
        .unwrap();
        assert!(out.timed_out);
        assert_eq!(out.state, UNKNOWN_STATE);

        let out = await_state(
            || async { Ok::<_, ApiError>(json!({"name": "sessions/1"})) },
            &targets(&["unknown"]),
            Duration::from_millis(200),
            Duration::from_millis(100),
            clock.as_ref(),
            sleeper.as_ref(),
        )
        .await
        .unwrap();
        assert!(!out.timed_out);
    }

    #[tokio::test]
    async fn fetch_errors_propagate_unchanged() {
        let clock = ManualClock::new();
        let sleeper = RecordingSleeper::driving(clock.clone());
        let calls = AtomicU32::new(0);
        let err = await_state(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 2 {
                        Err(ApiError::new(ErrorKind::NotFound, "session deleted"))
                    } else {
                        Ok(session("RUNNING"))
                    }
                }
            },
            &targets(&["COMPLETED"]),
            Duration::from_secs(10),
            Duration::from_millis(10),
            clock.as_ref(),
            sleeper.as_ref(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn real_timers_converge() {
        let calls = AtomicU32::new(0);
        let out = await_state(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                let state = if n >= 2 { "COMPLETED" } else { "RUNNING" };
                async move { Ok::<_, ApiError>(session(state)) }
            },
            &targets(&["COMPLETED"]),
            Duration::from_millis(1_000),
            Duration::from_millis(1),
            &MonotonicClock::new(),
            &TokioSleeper,
        )
        .await
        .unwrap();
        assert!(!out.timed_out);
        assert_eq!(out.state, "COMPLETED");
        assert!(out.attempts >= 2);
    }

    #[tokio::test]
    async fn real_timers_time_out() {
        let out = await_state(
            || async { Ok::<_, ApiError>(session("RUNNING")) },
            &targets(&["COMPLETED"]),
            Duration::from_millis(25),
            Duration::from_millis(5),
            &MonotonicClock::new(),
            &TokioSleeper,
        )
        .await
        .unwrap();
        assert!(out.timed_out);
        assert_eq!(out.state, "RUNNING");
        assert!(out.elapsed_ms >= 25);
    }
}
