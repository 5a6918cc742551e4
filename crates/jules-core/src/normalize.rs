//! Typed summaries of loosely-shaped API entities.
//!
//! The API returns open-ended JSON. These views pick out the fields callers
//! usually want; a field with an unexpected type is treated as absent.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSource {
    pub resource_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSession {
    pub resource_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_plan_approval: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedActivity {
    pub resource_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResultSummary {
    pub resource_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_activity: Option<NormalizedActivity>,
}

fn string_field(entity: &Value, key: &str) -> Option<String> {
    entity.get(key).and_then(Value::as_str).map(str::to_string)
}

fn resource_name(entity: &Value) -> String {
    string_field(entity, "name").unwrap_or_default()
}

/// `owner/repository` from `githubSource`, or just the repository when the
/// owner is missing.
fn github_repository(source: &Value) -> Option<String> {
    let github = source.get("githubSource").filter(|v| v.is_object())?;
    let repository = string_field(github, "repository")?;
    match string_field(github, "owner") {
        Some(owner) if !owner.is_empty() && !repository.is_empty() => {
            Some(format!("{owner}/{repository}"))
        }
        _ => Some(repository),
    }
}

pub fn normalize_source(source: &Value) -> NormalizedSource {
    let resource_name = resource_name(source);
    let provider = resource_name.split('/').nth(1).map(str::to_string);
    NormalizedSource {
        display_name: string_field(source, "displayName"),
        provider,
        repository: github_repository(source),
        resource_name,
    }
}

/// First non-empty `outputs[].pullRequest.url`.
fn pull_request_url(session: &Value) -> Option<String> {
    session
        .get("outputs")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|output| output.get("pullRequest")?.get("url")?.as_str())
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

pub fn normalize_session(session: &Value) -> NormalizedSession {
    NormalizedSession {
        resource_name: resource_name(session),
        title: string_field(session, "title"),
        state: string_field(session, "state"),
        require_plan_approval: session.get("requirePlanApproval").and_then(Value::as_bool),
        automation_mode: string_field(session, "automationMode"),
        create_time: string_field(session, "createTime"),
        update_time: string_field(session, "updateTime"),
        pr_url: pull_request_url(session),
    }
}

pub fn normalize_activity(activity: &Value) -> NormalizedActivity {
    NormalizedActivity {
        resource_name: resource_name(activity),
        create_time: string_field(activity, "createTime"),
        update_time: string_field(activity, "updateTime"),
        summary: string_field(activity, "summary"),
    }
}

/// Session headline plus the last activity in `activities`, if any.
pub fn summarize_session_result(session: &Value, activities: &[Value]) -> SessionResultSummary {
    let session = normalize_session(session);
    SessionResultSummary {
        resource_name: session.resource_name,
        state: session.state,
        pr_url: session.pr_url,
        latest_activity: activities.last().map(normalize_activity),
    }
}

/// Entries of the array field `key`, or an empty slice.
pub fn list_field<'a>(response: &'a Value, key: &str) -> &'a [Value] {
    response
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
