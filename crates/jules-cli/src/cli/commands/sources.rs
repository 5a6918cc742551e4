//! `jules list-sources` and `jules get-source`.

use jules_core::api::ListSourcesRequest;
use jules_core::normalize::{list_field, normalize_source, NormalizedSource};
use jules_core::{ApiError, JulesClient};
use serde_json::{json, Value};

use crate::cli::PageArgs;

pub async fn run_list_sources(
    client: &JulesClient,
    page: PageArgs,
    filter: Option<String>,
) -> Result<Value, ApiError> {
    let req = ListSourcesRequest {
        page_size: page.page_size,
        page_token: page.page_token,
        filter,
    };
    let response = client.list_sources(&req).await?;
    let sources: Vec<NormalizedSource> = list_field(&response, "sources")
        .iter()
        .map(normalize_source)
        .collect();
    Ok(json!({
        "sources": sources,
        "nextPageToken": response.get("nextPageToken"),
        "raw": response,
    }))
}

pub async fn run_get_source(client: &JulesClient, name: &str) -> Result<Value, ApiError> {
    let response = client.get_source(name).await?;
    Ok(json!({
        "source": normalize_source(&response),
        "raw": response,
    }))
}
