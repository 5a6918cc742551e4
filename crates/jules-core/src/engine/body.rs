use serde_json::{json, Value};

/// Decode a response body.
///
/// Empty bodies become `{}`; bodies that are not JSON are wrapped as
/// `{"raw": text}` so a malformed payload never fails an otherwise
/// successful call.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({});
    }
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => json!({ "raw": text }),
    }
}
