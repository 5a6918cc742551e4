use jules_core::config::ClientConfig;
use serde_json::{json, Value};

/// Resolved settings; the key is shown redacted.
pub fn run_show_config(config: &ClientConfig) -> Value {
    json!({ "config": config.summary() })
}
