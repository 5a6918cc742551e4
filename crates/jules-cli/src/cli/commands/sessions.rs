//! Session commands: list, create, get, send-message, approve-plan.

use jules_core::api::{
    build_create_session_request, CreateSessionInput, ListRequest, SendMessageRequest,
};
use jules_core::normalize::{list_field, normalize_session, NormalizedSession};
use jules_core::{ApiError, JulesClient};
use serde_json::{json, Value};

use crate::cli::PageArgs;

pub async fn run_list_sessions(client: &JulesClient, page: PageArgs) -> Result<Value, ApiError> {
    let req = ListRequest {
        page_size: page.page_size,
        page_token: page.page_token,
    };
    let response = client.list_sessions(&req).await?;
    let sessions: Vec<NormalizedSession> = list_field(&response, "sessions")
        .iter()
        .map(normalize_session)
        .collect();
    Ok(json!({
        "sessions": sessions,
        "nextPageToken": response.get("nextPageToken"),
        "raw": response,
    }))
}

pub async fn run_create_session(
    client: &JulesClient,
    input: CreateSessionInput,
) -> Result<Value, ApiError> {
    let request = build_create_session_request(input)?;
    let response = client.create_session(&request).await?;
    Ok(json!({
        "session": normalize_session(&response),
        "raw": response,
    }))
}

pub async fn run_get_session(client: &JulesClient, name: &str) -> Result<Value, ApiError> {
    let response = client.get_session(name).await?;
    Ok(json!({
        "session": normalize_session(&response),
        "raw": response,
    }))
}

pub async fn run_send_message(
    client: &JulesClient,
    session: &str,
    prompt: String,
) -> Result<Value, ApiError> {
    let response = client
        .send_message(session, &SendMessageRequest { prompt })
        .await?;
    Ok(json!({
        "sessionResourceName": session,
        "raw": response,
    }))
}

pub async fn run_approve_plan(client: &JulesClient, session: &str) -> Result<Value, ApiError> {
    let response = client.approve_plan(session).await?;
    Ok(json!({
        "sessionResourceName": session,
        "approved": true,
        "raw": response,
    }))
}
