//! Typed endpoint wrappers over `ApiGateway`.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` covers sign-in/out and identity; `projects` covers projects, tasks,
//! KPIs, AI helpers, analytics, and the health probe. Each method is one
//! request through the gateway, with no retries and no caching.

pub mod auth;
pub mod projects;
