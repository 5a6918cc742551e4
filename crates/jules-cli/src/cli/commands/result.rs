//! `jules session-result`.

use jules_core::{ApiError, JulesClient};
use serde_json::{json, Value};

pub async fn run_session_result(
    client: &JulesClient,
    session: &str,
    include_activities: bool,
    page_size: Option<u32>,
) -> Result<Value, ApiError> {
    let result = client
        .session_result(session, include_activities, page_size)
        .await?;
    Ok(json!({
        "summary": result.summary,
        "raw": {
            "session": result.session,
            "activities": result.activities,
        },
    }))
}
