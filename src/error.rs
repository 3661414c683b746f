//! Error taxonomy for gateway, storage, and session operations.
//!
//! DESIGN
//! ======
//! `Status` carries the text the server put in its `error` field so views can
//! show it verbatim. Its `Display` is the bare message; the HTTP status stays
//! available through `status()` for callers that branch on it.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Errors produced by the Nexo client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (connect, timeout, TLS...).
    #[error("request failed: {0}")]
    Transport(String),

    /// A response body could not be parsed as the expected JSON.
    #[error("response parse failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Reading or writing persisted client state failed.
    #[error("storage failed: {0}")]
    Storage(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of a server rejection, if this error is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401/403 responses, i.e. the credentials were refused.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
