//! Credential masking for logs and user-facing output.

const REDACTED: &str = "***REDACTED***";

fn should_redact_header(name: &str) -> bool {
    let normalized = name.to_ascii_lowercase();
    normalized.contains("authorization")
        || normalized.contains("api-key")
        || normalized.contains("token")
}

/// Keep the first and last four characters of long keys; hide short ones.
pub fn redact_api_key(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return REDACTED.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Copy of `headers` with credential-bearing values masked.
pub fn redact_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if should_redact_header(name) {
                REDACTED.to_string()
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}
