//! Nexo client: session lifecycle, API gateway, and typed endpoints for the
//! Nexo project-management backend.
//!
//! ARCHITECTURE
//! ============
//! `gateway` issues every request and owns the bearer token; `api` adds one
//! typed method per endpoint on top of it. `session` and `theme` are the two
//! state stores views subscribe to, `storage` persists what must survive a
//! restart, and `routes` decides which view a navigation lands on. `state`
//! wires them together once at startup.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod theme;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::ClientConfig;
pub use error::ApiError;
pub use gateway::ApiGateway;
pub use session::{SessionSnapshot, SessionStore};
pub use state::AppState;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use theme::{Theme, ThemePreference, ThemeStore};
