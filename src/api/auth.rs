//! Authentication endpoints.
//!
//! The three sign-in calls store the returned token through
//! `ApiGateway::set_token` before returning, so the next request already
//! carries it. `logout` erases the token only when the server accepted the
//! call; unconditional local teardown belongs to `SessionStore::logout`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use reqwest::Method;
use serde_json::Value;

use crate::error::ApiError;
use crate::gateway::ApiGateway;
use crate::types::{AuthResponse, LoginRequest, OAuthProvider, RegisterProfile, User};

pub(crate) const LOGIN_PATH: &str = "/auth/login";
pub(crate) const REGISTER_PATH: &str = "/auth/register";
pub(crate) const LOGOUT_PATH: &str = "/auth/logout";
pub(crate) const ME_PATH: &str = "/auth/me";

pub(crate) fn oauth_endpoint(provider: OAuthProvider) -> String {
    format!("/auth/oauth/{provider}")
}

impl ApiGateway {
    /// Sign in with email and password via `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns the server's error text for rejected credentials, or a
    /// transport/decode error. The stored token is untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.post(LOGIN_PATH, &LoginRequest { email, password }).await?;
        self.adopt_token(response)
    }

    /// Create an account via `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Same contract as [`ApiGateway::login`].
    pub async fn register(&self, profile: &RegisterProfile) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.post(REGISTER_PATH, profile).await?;
        self.adopt_token(response)
    }

    /// Complete an OAuth sign-in via `POST /auth/oauth/{provider}`.
    ///
    /// `data` is the provider callback payload, sent as `{}` when absent.
    ///
    /// # Errors
    ///
    /// Same contract as [`ApiGateway::login`].
    pub async fn oauth_login(&self, provider: OAuthProvider, data: Option<Value>) -> Result<AuthResponse, ApiError> {
        let body = data.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let response: AuthResponse = self.request(Method::POST, &oauth_endpoint(provider), Some(body)).await?;
        self.adopt_token(response)
    }

    /// End the server session via `POST /auth/logout`, then erase the token.
    ///
    /// # Errors
    ///
    /// Returns the request error; the token is kept in that case.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let _: Value = self.request(Method::POST, LOGOUT_PATH, None).await?;
        self.set_token(None)
    }

    /// Store the token of a successful sign-in. An empty token is rejected
    /// before storage is touched, so the previous token survives.
    fn adopt_token(&self, response: AuthResponse) -> Result<AuthResponse, ApiError> {
        if response.token.trim().is_empty() {
            tracing::error!(user_id = response.user.id, "sign-in response carried an empty token");
            return Err(ApiError::Decode("sign-in response carried an empty token".into()));
        }
        self.set_token(Some(&response.token))?;
        Ok(response)
    }

    /// Fetch the user the current token belongs to via `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// `401` when the token is missing, invalid, or expired.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get(ME_PATH).await
    }
}
