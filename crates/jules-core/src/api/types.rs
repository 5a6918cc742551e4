use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::normalize::SessionResultSummary;
use crate::poller::TargetStates;
use crate::retry::ApiError;

/// Paging parameters shared by the list operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSourcesRequest {
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationMode {
    AutomationModeUnspecified,
    #[default]
    AutoCreatePr,
}

impl AutomationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AutomationMode::AutomationModeUnspecified => "AUTOMATION_MODE_UNSPECIFIED",
            AutomationMode::AutoCreatePr => "AUTO_CREATE_PR",
        }
    }
}

impl fmt::Display for AutomationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutomationMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUTOMATION_MODE_UNSPECIFIED" => Ok(AutomationMode::AutomationModeUnspecified),
            "AUTO_CREATE_PR" => Ok(AutomationMode::AutoCreatePr),
            other => Err(ApiError::invalid_argument(format!(
                "Invalid automationMode \"{other}\". \
                 Expected AUTOMATION_MODE_UNSPECIFIED or AUTO_CREATE_PR."
            ))),
        }
    }
}

/// Caller-facing input for [`super::build_create_session_request`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSessionInput {
    pub source_resource_name: String,
    pub prompt: String,
    pub title: Option<String>,
    pub starting_branch: Option<String>,
    pub require_plan_approval: Option<bool>,
    pub automation_mode: Option<AutomationMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubRepoContext {
    pub starting_branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContext {
    pub source: String,
    pub github_repo_context: GithubRepoContext,
}

/// Wire body of `POST sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub source_context: SourceContext,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub require_plan_approval: bool,
    pub automation_mode: AutomationMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest {
    pub prompt: String,
}

/// Overrides for [`super::JulesClient::wait_for_session_state`].
/// Unset fields fall back to terminal states and the configured poll timing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitOptions {
    pub targets: Option<TargetStates>,
    pub timeout: Option<Duration>,
    pub interval: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResult {
    pub summary: SessionResultSummary,
    pub session: Value,
    pub activities: Vec<Value>,
}
