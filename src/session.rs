//! Session store: the single source of truth for authentication state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views never touch the token or user directly. They hold an
//! `Arc<SessionStore>`, call its methods, and watch `subscribe()` for
//! snapshots. The token itself lives in the shared `ApiGateway`, which
//! persists it; the user only lives here, in memory.
//!
//! LIFECYCLE
//! =========
//! Starts loading. `restore()` replays a stored token against `/auth/me`
//! once; a rejection (or any failure) erases the token and leaves the
//! session signed out. Sign-in calls set token + user together. `logout()`
//! always tears down locally, whatever the server said.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ApiError;
use crate::gateway::ApiGateway;
use crate::types::{AuthResponse, OAuthProvider, RegisterProfile, User, UserPatch};

/// Immutable view of the session handed to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    /// The token was accepted by the server on the last validation call.
    pub is_authenticated: bool,
    /// A network round trip is in flight (or `restore()` has not run yet).
    pub is_loading: bool,
    /// User-facing text of the last failed sign-in.
    pub error: Option<String>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self { user: None, is_authenticated: false, is_loading: true, error: None }
    }
}

pub struct SessionStore {
    gateway: Arc<ApiGateway>,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    #[must_use]
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { gateway, state }
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<ApiGateway> {
        &self.gateway
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// True iff token and user are both present and the server accepted the
    /// token on the last validation call.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let state = self.state.borrow();
        state.is_authenticated && state.user.is_some() && self.gateway.token().is_some()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Re-establish the session from a stored token, if any.
    ///
    /// Issues at most one `/auth/me` call and never retries. Returns whether
    /// the session ended up authenticated.
    pub async fn restore(&self) -> bool {
        let stored = self.gateway.stored_token().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read stored token; starting signed out");
            None
        });

        let Some(token) = stored else {
            self.state.send_modify(|s| {
                s.user = None;
                s.is_authenticated = false;
                s.is_loading = false;
            });
            return false;
        };

        self.set_loading();
        let validated = match self.gateway.set_token(Some(&token)) {
            Ok(()) => self.gateway.current_user().await,
            Err(e) => Err(e),
        };

        match validated {
            Ok(user) => {
                tracing::info!(user_id = user.id, "session restored");
                self.state.send_modify(|s| {
                    s.user = Some(user);
                    s.is_authenticated = true;
                    s.is_loading = false;
                });
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored token rejected; clearing session");
                if let Err(e) = self.gateway.set_token(None) {
                    tracing::warn!(error = %e, "failed to erase stored token");
                }
                self.state.send_modify(|s| {
                    s.user = None;
                    s.is_authenticated = false;
                    s.is_loading = false;
                });
                false
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; its text is also recorded in
    /// `SessionSnapshot::error`. Token and user are unchanged on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        self.begin_sign_in();
        let result = self.gateway.login(email, password).await;
        self.finish_sign_in(result)
    }

    /// Create an account and sign in with it.
    ///
    /// # Errors
    ///
    /// Same contract as [`SessionStore::login`].
    pub async fn register(&self, profile: &RegisterProfile) -> Result<User, ApiError> {
        self.begin_sign_in();
        let result = self.gateway.register(profile).await;
        self.finish_sign_in(result)
    }

    /// Sign in through an OAuth provider.
    ///
    /// # Errors
    ///
    /// Same contract as [`SessionStore::login`].
    pub async fn login_with_oauth(&self, provider: OAuthProvider) -> Result<User, ApiError> {
        self.begin_sign_in();
        let result = self.gateway.oauth_login(provider, None).await;
        self.finish_sign_in(result)
    }

    /// End the session. Local teardown is unconditional: a failed server call
    /// is logged and otherwise ignored.
    pub async fn logout(&self) {
        self.set_loading();
        if let Err(e) = self.gateway.logout().await {
            tracing::warn!(error = %e, "server logout failed; clearing local session anyway");
        }
        if let Err(e) = self.gateway.set_token(None) {
            tracing::warn!(error = %e, "failed to erase stored token");
        }
        self.state.send_modify(|s| {
            s.user = None;
            s.is_authenticated = false;
            s.error = None;
            s.is_loading = false;
        });
    }

    /// Merge `patch` into the in-memory user. No server round trip.
    ///
    /// Returns `false` (and changes nothing) when no user is signed in.
    pub fn update_user(&self, patch: UserPatch) -> bool {
        self.state.send_if_modified(|s| match s.user.as_mut() {
            Some(user) => {
                user.merge(patch);
                true
            }
            None => false,
        })
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn set_loading(&self) {
        self.state.send_modify(|s| s.is_loading = true);
    }

    fn begin_sign_in(&self) {
        self.state.send_modify(|s| {
            s.error = None;
            s.is_loading = true;
        });
    }

    fn finish_sign_in(&self, result: Result<AuthResponse, ApiError>) -> Result<User, ApiError> {
        match result {
            Ok(response) => {
                tracing::info!(user_id = response.user.id, provider = ?response.provider, "signed in");
                let user = response.user;
                let has_token = self.gateway.token().is_some();
                self.state.send_modify(|s| {
                    s.user = Some(user.clone());
                    s.is_authenticated = has_token;
                    s.is_loading = false;
                });
                Ok(user)
            }
            Err(e) => {
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.is_loading = false;
                });
                Err(e)
            }
        }
    }
}
