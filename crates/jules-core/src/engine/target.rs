//! Request URL construction.

use ::url::Url;

use super::Operation;
use crate::config::ClientConfig;
use crate::retry::{ApiError, ErrorKind};

/// `base_url / api_version / path?query`.
///
/// Each `/`-delimited segment of the version and path is percent-encoded on
/// its own, so slashes stay structural while spaces and other reserved
/// characters inside a segment are escaped. Empty segments are dropped.
pub fn build_url(config: &ClientConfig, op: &Operation) -> Result<Url, ApiError> {
    let mut url = Url::parse(&config.base_url).map_err(|e| {
        ApiError::new(
            ErrorKind::Unknown,
            format!("invalid base URL \"{}\": {e}", config.base_url),
        )
    })?;

    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            ApiError::new(
                ErrorKind::Unknown,
                format!("base URL \"{}\" cannot carry a path", config.base_url),
            )
        })?;
        segments.pop_if_empty();
        let parts = config
            .api_version
            .split('/')
            .chain(op.path().split('/'))
            .filter(|s| !s.is_empty());
        for part in parts {
            segments.push(part);
        }
    }

    if !op.query_params().is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in op.query_params() {
            pairs.append_pair(key, &value.to_string());
        }
    }

    Ok(url)
}
