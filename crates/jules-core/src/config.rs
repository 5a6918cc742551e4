use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::redact::redact_api_key;

pub const DEFAULT_BASE_URL: &str = "https://jules.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v1alpha";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_MAX_POLL_MS: u64 = 600_000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const MISSING_API_KEY: &str = "Missing JULES_API_KEY. Create an API key in Jules and export it \
                               (or set api_key in the config file) before running.";

/// Immutable client configuration shared by every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Credential sent as `X-Goog-Api-Key`.
    pub api_key: String,
    /// Scheme + host, no trailing slash.
    pub base_url: String,
    /// Version path segment, no surrounding slashes.
    pub api_version: String,
    /// Hard timeout per transport attempt.
    pub timeout: Duration,
    /// Retries after the first attempt for retryable failures.
    pub max_retries: u32,
    /// Default delay between state polls.
    pub poll_interval: Duration,
    /// Default deadline for a state poll.
    pub max_poll: Duration,
}

impl ClientConfig {
    /// Configuration with built-in defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_poll: Duration::from_millis(DEFAULT_MAX_POLL_MS),
        }
    }

    /// Display form with the credential masked.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            api_key: redact_api_key(&self.api_key),
            base_url: self.base_url.clone(),
            api_version: self.api_version.clone(),
            http_timeout_ms: self.timeout.as_millis() as u64,
            max_retries: self.max_retries,
            poll_interval_ms: self.poll_interval.as_millis() as u64,
            max_poll_ms: self.max_poll.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub http_timeout_ms: u64,
    pub max_retries: u32,
    pub poll_interval_ms: u64,
    pub max_poll_ms: u64,
}

/// Optional settings from `~/.config/jules/config.toml`. Environment
/// variables take precedence over every key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
    pub http_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub max_poll_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("jules")?;
    Ok(xdg_dirs.get_config_file("config.toml"))
}

/// Read the config file; a missing file yields an empty [`FileConfig`].
pub fn load_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        tracing::debug!("no config file at {}, using defaults", path.display());
        return Ok(FileConfig::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    let cfg: FileConfig = toml::from_str(&data)
        .with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Load the effective configuration from the config file and process env.
pub fn load() -> Result<ClientConfig> {
    let path = config_path()?;
    let file = load_file(&path)?;
    let env: HashMap<String, String> = std::env::vars().collect();
    resolve(&file, &env)
}

/// Merge defaults, file values and `JULES_*` env values, then validate.
pub fn resolve(file: &FileConfig, env: &HashMap<String, String>) -> Result<ClientConfig> {
    let file_key = file.api_key.as_deref().map(str::trim);
    let api_key = env_value(env, "JULES_API_KEY")
        .or(file_key.filter(|v| !v.is_empty()))
        .ok_or_else(|| anyhow!(MISSING_API_KEY))?
        .to_string();

    let base_url = env_value(env, "JULES_API_BASE_URL")
        .or(file.base_url.as_deref())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string();
    validate_base_url(&base_url)?;

    let api_version = env_value(env, "JULES_API_VERSION")
        .or(file.api_version.as_deref())
        .unwrap_or(DEFAULT_API_VERSION)
        .trim_matches('/')
        .to_string();

    let timeout_ms = number(
        "JULES_HTTP_TIMEOUT_MS",
        env_value(env, "JULES_HTTP_TIMEOUT_MS"),
        file.http_timeout_ms,
        DEFAULT_HTTP_TIMEOUT_MS,
        1_000,
        300_000,
    )?;
    let poll_interval_ms = number(
        "JULES_POLL_INTERVAL_MS",
        env_value(env, "JULES_POLL_INTERVAL_MS"),
        file.poll_interval_ms,
        DEFAULT_POLL_INTERVAL_MS,
        100,
        120_000,
    )?;
    let max_poll_ms = number(
        "JULES_MAX_POLL_MS",
        env_value(env, "JULES_MAX_POLL_MS"),
        file.max_poll_ms,
        DEFAULT_MAX_POLL_MS,
        500,
        7_200_000,
    )?;
    let max_retries = number(
        "JULES_MAX_RETRIES",
        env_value(env, "JULES_MAX_RETRIES"),
        file.max_retries.map(u64::from),
        u64::from(DEFAULT_MAX_RETRIES),
        0,
        10,
    )?;

    Ok(ClientConfig {
        api_key,
        base_url,
        api_version,
        timeout: Duration::from_millis(timeout_ms),
        max_retries: max_retries as u32,
        poll_interval: Duration::from_millis(poll_interval_ms),
        max_poll: Duration::from_millis(max_poll_ms),
    })
}

fn env_value<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Env value wins over file value; both are range-checked.
fn number(
    key: &str,
    env_value: Option<&str>,
    file_value: Option<u64>,
    fallback: u64,
    min: u64,
    max: u64,
) -> Result<u64> {
    let invalid = |raw: &str| {
        anyhow!("Invalid {key} value \"{raw}\". Expected a number between {min} and {max}.")
    };
    let value = match (env_value, file_value) {
        (Some(raw), _) => raw.parse::<u64>().map_err(|_| invalid(raw))?,
        (None, Some(v)) => v,
        (None, None) => return Ok(fallback),
    };
    if value < min || value > max {
        return Err(invalid(&value.to_string()));
    }
    Ok(value)
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed = url::Url::parse(base_url)
        .with_context(|| format!("Invalid JULES_API_BASE_URL value \"{base_url}\""))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        bail!("Invalid JULES_API_BASE_URL value \"{base_url}\". Expected an http(s) URL.");
    }
    Ok(())
}
