//! `jules list-activities` and `jules get-activity`.

use jules_core::api::ListRequest;
use jules_core::normalize::{list_field, normalize_activity, NormalizedActivity};
use jules_core::{ApiError, JulesClient};
use serde_json::{json, Value};

use crate::cli::PageArgs;

pub async fn run_list_activities(
    client: &JulesClient,
    session: &str,
    page: PageArgs,
) -> Result<Value, ApiError> {
    let req = ListRequest {
        page_size: page.page_size,
        page_token: page.page_token,
    };
    let response = client.list_activities(session, &req).await?;
    let activities: Vec<NormalizedActivity> = list_field(&response, "activities")
        .iter()
        .map(normalize_activity)
        .collect();
    Ok(json!({
        "activities": activities,
        "nextPageToken": response.get("nextPageToken"),
        "raw": response,
    }))
}

pub async fn run_get_activity(client: &JulesClient, name: &str) -> Result<Value, ApiError> {
    let response = client.get_activity(name).await?;
    Ok(json!({
        "activity": normalize_activity(&response),
        "raw": response,
    }))
}
