//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ApiError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATE_DIR_NAME: &str = ".nexo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute API root every relative path is appended to. Never ends in `/`.
    pub base_url: String,
    pub timeouts: Timeouts,
    /// Directory `FileStorage` keeps the token and theme files in.
    pub state_dir: PathBuf,
}

impl ClientConfig {
    /// Config pointing at `base_url` with default timeouts and state dir.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            timeouts: Timeouts::default(),
            state_dir: default_state_dir(std::env::var("HOME").ok().as_deref()),
        }
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `NEXO_API_BASE_URL`: default `http://localhost:5000/api`
    /// - `NEXO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `NEXO_CONNECT_TIMEOUT_SECS`: default 10
    /// - `NEXO_STATE_DIR`: default `$HOME/.nexo`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` when the base URL is not http(s) or a
    /// timeout is not a positive integer.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_env_with_base_url(None)
    }

    /// Like [`ClientConfig::from_env`], but an explicit `base_url` wins and
    /// `NEXO_API_BASE_URL` is then neither read nor validated.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`], applied to the base URL actually
    /// used.
    pub fn from_env_with_base_url(base_url: Option<&str>) -> Result<Self, ApiError> {
        let base_url = match base_url {
            Some(raw) => parse_base_url(raw)?,
            None => {
                let raw = std::env::var("NEXO_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
                parse_base_url(&raw)?
            }
        };

        let timeouts = Timeouts {
            request_secs: env_parse_secs("NEXO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_secs("NEXO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        let state_dir = match std::env::var("NEXO_STATE_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_state_dir(std::env::var("HOME").ok().as_deref()),
        };

        Ok(Self { base_url, timeouts, state_dir })
    }
}

pub fn parse_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ApiError::Config(format!("NEXO_API_BASE_URL must be http(s): {trimmed}")));
    }
    Ok(normalize_base_url(trimmed))
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn env_parse_secs(key: &str, default: u64) -> Result<u64, ApiError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ApiError::Config(format!("{key} must be a positive integer, got '{raw}'"))),
        Ok(v) => Ok(v),
    }
}

fn default_state_dir(home: Option<&str>) -> PathBuf {
    match home {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(DEFAULT_STATE_DIR_NAME),
        _ => PathBuf::from(DEFAULT_STATE_DIR_NAME),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
