//! Typed operations over the Jules REST API.
//!
//! Every call goes through [`RequestEngine::execute`], so retries, timeouts
//! and error classification are uniform. Responses are returned as raw JSON;
//! see [`crate::normalize`] for typed views.

mod types;

pub use types::{
    AutomationMode, CreateSessionInput, CreateSessionRequest, GithubRepoContext, ListRequest,
    ListSourcesRequest, SendMessageRequest, SessionResult, SourceContext, WaitOptions,
};

use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::engine::{Operation, RequestEngine};
use crate::normalize::{list_field, summarize_session_result};
use crate::poller::{await_state, PollOutcome, TargetStates};
use crate::retry::ApiError;
use crate::time::{Clock, MonotonicClock};

/// Page size used by [`JulesClient::session_result`] when none is given.
pub const DEFAULT_ACTIVITIES_PAGE_SIZE: u32 = 50;

fn is_valid_source_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('/').collect();
    parts.len() == 4 && parts[0] == "sources" && parts[1..].iter().all(|p| !p.is_empty())
}

/// Validate `input` and fill in defaults for the create-session body.
pub fn build_create_session_request(
    input: CreateSessionInput,
) -> Result<CreateSessionRequest, ApiError> {
    if !is_valid_source_name(&input.source_resource_name) {
        return Err(ApiError::invalid_argument(format!(
            "Invalid sourceResourceName \"{}\". \
             Expected format: sources/<provider>/<owner>/<repo>.",
            input.source_resource_name
        )));
    }
    let starting_branch = match input.starting_branch {
        Some(branch) if !branch.trim().is_empty() => branch,
        _ => {
            return Err(ApiError::invalid_argument(
                "Missing startingBranch. Provide the repository branch explicitly \
                 (for example, \"main\") when creating a Jules session.",
            ));
        }
    };
    if input.prompt.trim().is_empty() {
        return Err(ApiError::invalid_argument("prompt must not be empty"));
    }

    Ok(CreateSessionRequest {
        source_context: SourceContext {
            source: input.source_resource_name,
            github_repo_context: GithubRepoContext { starting_branch },
        },
        prompt: input.prompt,
        title: input.title,
        require_plan_approval: input.require_plan_approval.unwrap_or(false),
        automation_mode: input.automation_mode.unwrap_or_default(),
    })
}

fn resource(name: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = name.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::invalid_argument(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone)]
pub struct JulesClient {
    engine: RequestEngine,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for JulesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JulesClient")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl JulesClient {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self::from_engine(RequestEngine::new(config), Arc::new(MonotonicClock::new()))
    }

    pub fn from_engine(engine: RequestEngine, clock: Arc<dyn Clock>) -> Self {
        Self { engine, clock }
    }

    pub fn config(&self) -> &ClientConfig {
        self.engine.config()
    }

    pub async fn list_sources(&self, req: &ListSourcesRequest) -> Result<Value, ApiError> {
        let op = Operation::get("sources")
            .query("pageSize", req.page_size)
            .query("pageToken", req.page_token.as_ref())
            .query("filter", req.filter.as_ref());
        self.engine.execute(&op).await
    }

    pub async fn get_source(&self, name: &str) -> Result<Value, ApiError> {
        let name = resource(name, "sourceResourceName")?;
        self.engine.execute(&Operation::get(name)).await
    }

    pub async fn list_sessions(&self, req: &ListRequest) -> Result<Value, ApiError> {
        let op = Operation::get("sessions")
            .query("pageSize", req.page_size)
            .query("pageToken", req.page_token.as_ref());
        self.engine.execute(&op).await
    }

    pub async fn create_session(&self, req: &CreateSessionRequest) -> Result<Value, ApiError> {
        let body = serde_json::to_value(req)
            .map_err(|e| ApiError::invalid_argument(e.to_string()))?;
        tracing::info!(source = %req.source_context.source, "creating session");
        let op = Operation::post("sessions", body);
        self.engine.execute(&op).await
    }

    pub async fn get_session(&self, name: &str) -> Result<Value, ApiError> {
        let name = resource(name, "sessionResourceName")?;
        self.engine.execute(&Operation::get(name)).await
    }

    pub async fn list_activities(
        &self,
        session: &str,
        req: &ListRequest,
    ) -> Result<Value, ApiError> {
        let session = resource(session, "sessionResourceName")?;
        let op = Operation::get(format!("{session}/activities"))
            .query("pageSize", req.page_size)
            .query("pageToken", req.page_token.as_ref());
        self.engine.execute(&op).await
    }

    pub async fn get_activity(&self, name: &str) -> Result<Value, ApiError> {
        let name = resource(name, "activityResourceName")?;
        self.engine.execute(&Operation::get(name)).await
    }

    pub async fn send_message(
        &self,
        session: &str,
        req: &SendMessageRequest,
    ) -> Result<Value, ApiError> {
        let session = resource(session, "sessionResourceName")?;
        if req.prompt.trim().is_empty() {
            return Err(ApiError::invalid_argument("prompt must not be empty"));
        }
        let body = json!({ "prompt": req.prompt });
        let op = Operation::post(format!("{session}:sendMessage"), body);
        self.engine.execute(&op).await
    }

    pub async fn approve_plan(&self, session: &str) -> Result<Value, ApiError> {
        let session = resource(session, "sessionResourceName")?;
        tracing::info!(session = %session, "approving plan");
        let op = Operation::post(format!("{session}:approvePlan"), json!({}));
        self.engine.execute(&op).await
    }

    /// Poll `get_session` until the session reaches one of the target states.
    pub async fn wait_for_session_state(
        &self,
        session: &str,
        opts: &WaitOptions,
    ) -> Result<PollOutcome, ApiError> {
        let session = resource(session, "sessionResourceName")?;
        let targets = opts.targets.clone().unwrap_or_else(TargetStates::terminal);
        let config = self.engine.config();
        let timeout = opts.timeout.unwrap_or(config.max_poll);
        let interval = opts.interval.unwrap_or(config.poll_interval);

        await_state(
            || self.get_session(&session),
            &targets,
            timeout,
            interval,
            self.clock.as_ref(),
            self.engine.sleeper(),
        )
        .await
    }

    /// Session summary with its PR link and, optionally, the latest activity.
    pub async fn session_result(
        &self,
        session: &str,
        include_activities: bool,
        page_size: Option<u32>,
    ) -> Result<SessionResult, ApiError> {
        let session_value = self.get_session(session).await?;
        let activities = if include_activities {
            let req = ListRequest {
                page_size: Some(page_size.unwrap_or(DEFAULT_ACTIVITIES_PAGE_SIZE)),
                page_token: None,
            };
            let response = self.list_activities(session, &req).await?;
            list_field(&response, "activities").to_vec()
        } else {
            Vec::new()
        };

        Ok(SessionResult {
            summary: summarize_session_result(&session_value, &activities),
            session: session_value,
            activities,
        })
    }
}
