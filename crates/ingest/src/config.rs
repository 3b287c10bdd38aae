use crate::error::{IngestError, IngestResult};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.cartolafc.globo.com";
pub const DEFAULT_LOGIN_URL: &str = "https://login.globo.com/api/authentication";

/// Attempts per GET before a connection failure is reported.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Pause between attempts after a connection failure (milliseconds).
pub const DEFAULT_RETRY_DELAY_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// API root, without trailing slash (CARTOLA_API_URL)
    pub api_url: String,
    /// Login endpoint (CARTOLA_LOGIN_URL)
    pub login_url: String,
    /// Per-request timeout (CARTOLA_HTTP_TIMEOUT_SECS)
    pub http_timeout: Duration,
    /// Total GET attempts on connection failure (CARTOLA_MAX_ATTEMPTS)
    pub max_attempts: u32,
    /// CARTOLA_RETRY_DELAY_MS
    pub retry_delay: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl IngestConfig {
    pub fn from_env() -> IngestResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> IngestResult<Self> {
        let http_timeout_secs = parse_var(&lookup, "CARTOLA_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        let max_attempts = parse_var(&lookup, "CARTOLA_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(IngestError::Config(
                "CARTOLA_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        let retry_delay_ms = parse_var(&lookup, "CARTOLA_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?;

        Ok(Self {
            api_url: lookup("CARTOLA_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            login_url: lookup("CARTOLA_LOGIN_URL").unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            max_attempts,
            retry_delay: Duration::from_millis(retry_delay_ms),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> IngestResult<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| IngestError::Config(format!("{key} must be a non-negative integer, got {raw:?}"))),
        None => Ok(default),
    }
}
