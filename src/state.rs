//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is built once at startup and handed to every consumer. It owns
//! the single `ApiGateway` and the two state stores built on top of it; all
//! inner fields are `Arc`-wrapped so clones share the same session.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::gateway::ApiGateway;
use crate::session::SessionStore;
use crate::storage::KeyValueStorage;
use crate::theme::ThemeStore;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ApiGateway>,
    pub session: Arc<SessionStore>,
    pub theme: Arc<ThemeStore>,
}

impl AppState {
    /// Wire gateway, session, and theme over one storage backend.
    ///
    /// Does not touch the network; call `session.restore()` to validate a
    /// stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or storage cannot
    /// be read.
    pub fn new(config: &ClientConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self, ApiError> {
        let gateway = Arc::new(ApiGateway::new(config, storage.clone())?);
        let session = Arc::new(SessionStore::new(gateway.clone()));
        let theme = Arc::new(ThemeStore::load(storage));
        Ok(Self { gateway, session, theme })
    }
}
