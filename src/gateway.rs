//! API gateway: the single choke point for outbound REST calls.
//!
//! ARCHITECTURE
//! ============
//! One `ApiGateway` is built at startup and shared by `Arc` with the session
//! store and every other consumer. It owns the HTTP client, the API base URL,
//! and the current bearer token (mirrored to `KeyValueStorage`).
//!
//! ERROR HANDLING
//! ==============
//! Non-success responses become `ApiError::Status` carrying the server's
//! `error` text, or `HTTP <status>` when the body has none. Transport and
//! decode failures are logged here and propagated. Nothing is retried.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::storage::{KeyValueStorage, TOKEN_KEY};

// =============================================================================
// GATEWAY
// =============================================================================

pub struct ApiGateway {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    storage: Arc<dyn KeyValueStorage>,
}

impl ApiGateway {
    /// Build the gateway and load any previously stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or storage cannot
    /// be read.
    pub fn new(config: &ClientConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let token = non_empty(storage.get_item(TOKEN_KEY)?);
        Ok(Self { http, base_url: config.base_url.clone(), token: RwLock::new(token), storage })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token currently attached to requests.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Token as persisted in storage, which may differ from `token()` only if
    /// something outside this gateway wrote the storage.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if storage cannot be read.
    pub fn stored_token(&self) -> Result<Option<String>, ApiError> {
        Ok(non_empty(self.storage.get_item(TOKEN_KEY)?))
    }

    /// Replace the token and persist it; `None` (or an empty string) erases
    /// it.
    ///
    /// A new token is adopted in memory only once storage accepted it.
    /// Erasing always clears memory, even when storage removal fails.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if storage cannot be written.
    pub fn set_token(&self, token: Option<&str>) -> Result<(), ApiError> {
        match token.filter(|t| !t.is_empty()) {
            Some(t) => {
                self.storage.set_item(TOKEN_KEY, t)?;
                *self.token.write().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(t.to_owned());
                Ok(())
            }
            None => {
                *self.token.write().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
                self.storage.remove_item(TOKEN_KEY)
            }
        }
    }

    /// Absolute URL for a path relative to the API base.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    // =========================================================================
    // REQUEST PIPELINE
    // =========================================================================

    /// Issue one request and decode the JSON response into `T`.
    ///
    /// An empty success body (e.g. `204 No Content`) decodes as JSON `null`,
    /// so `T = ()` or `T = Value` fit endpoints that return nothing.
    ///
    /// # Errors
    ///
    /// `ApiError::Status` for non-success responses, `Transport` when no
    /// response arrived, `Decode` when the body does not match `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let headers = request_headers(self.token().as_deref()).map_err(|err| {
            tracing::error!(%method, %url, error = %err, "API request headers invalid");
            err
        })?;

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(&body)?);
        }

        let response = request.send().await.map_err(|e| {
            let err = ApiError::from(e);
            tracing::error!(%method, %url, error = %err, "API request failed");
            err
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            let err = ApiError::from(e);
            tracing::error!(%method, %url, error = %err, "API response read failed");
            err
        })?;

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &bytes);
            tracing::warn!(%method, %url, status = status.as_u16(), error = %err, "API request rejected");
            return Err(err);
        }

        parse_success_body(&bytes).map_err(|err| {
            tracing::error!(%method, %url, error = %err, "API response parse failed");
            err
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(serde_json::to_value(body)?)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.request(Method::PUT, path, Some(serde_json::to_value(body)?)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, None).await
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return base_url.to_owned();
    }
    if path.starts_with('/') || path.starts_with('?') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

/// Headers for every request: JSON content type, plus bearer auth iff a
/// token is set.
pub(crate) fn request_headers(token: Option<&str>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ApiError::Config(format!("token is not a valid header value: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Map a rejected response to `ApiError::Status`.
pub(crate) fn error_from_body(status: u16, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(ToOwned::to_owned))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"));
    ApiError::Status { status, message }
}

pub(crate) fn parse_success_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_slice(body)?)
}
