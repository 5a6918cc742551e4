//! Parse raw HTTP response header lines collected by curl.

/// Turn header lines into `(name, value)` pairs.
///
/// Only the last header block is kept: interim responses (`100 Continue`)
/// start a new block with their own status line.
pub(crate) fn parse_header_lines(lines: &[String]) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            headers.clear();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    headers
}
