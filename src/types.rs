//! Wire DTOs for the Nexo REST API.
//!
//! DESIGN
//! ======
//! The backend owns these records; the client consumes them without
//! validating. Every struct keeps fields it does not know about in `extra` so
//! a round trip through the client never drops data.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// USER / AUTH
// =============================================================================

/// The authenticated user as returned by `/auth/me` and the sign-in calls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Best label for the user: name, then username, then email.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .map_or_else(|| format!("user #{}", self.id), ToOwned::to_owned)
    }

    /// Overlay every field present in `patch`; absent fields are untouched.
    ///
    /// An integer `id` in the patch replaces `self.id`; a non-integer one is
    /// dropped. Either way `extra` never holds an `id` key.
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = Some(name);
        }
        if let Some(username) = patch.username {
            self.username = Some(username);
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        let mut extra = patch.extra;
        if let Some(id) = extra.remove("id") {
            if let Some(id) = id.as_i64() {
                self.id = id;
            }
        }
        self.extra.extend(extra);
    }
}

/// Partial user fields for local, in-memory updates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Profile sent to `POST /auth/register`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterProfile {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Response of every sign-in endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
    /// Set by the OAuth endpoint only.
    #[serde(default)]
    pub provider: Option<String>,
}

/// Supported OAuth providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Microsoft,
}

impl OAuthProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
        }
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "microsoft" => Ok(Self::Microsoft),
            other => Err(format!("unsupported OAuth provider: {other}")),
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PROJECTS
// =============================================================================

/// A project. Dates are ISO-8601 strings exactly as the backend sends them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub smart_objective: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// `planning`, `active`, `completed` or `paused`.
    pub status: String,
    pub progress: f64,
    pub budget: Option<f64>,
    pub actual_cost: f64,
    pub user_id: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub tasks_count: u32,
    pub kpis_count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A project task.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// `todo`, `in_progress`, `done` or `blocked`.
    pub status: String,
    /// `low`, `medium`, `high` or `urgent`.
    pub priority: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,
    pub progress: f64,
    pub project_id: i64,
    pub assigned_to: Option<i64>,
    pub parent_task_id: Option<i64>,
    pub order_index: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub subtasks_count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tracked project indicator (deadline, cost, quality, satisfaction...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kpi {
    pub id: i64,
    pub project_id: i64,
    pub kpi_type: String,
    pub target_value: Option<f64>,
    pub current_value: f64,
    pub unit: Option<String>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// AI HELPERS / ANALYTICS
// =============================================================================

/// Response of `POST /projects/generate-smart-objective`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartObjective {
    pub smart_objective: String,
    pub generated_at: Option<String>,
}

/// A task template produced by `POST /projects/{id}/generate-tasks`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedTask {
    pub title: String,
    pub description: Option<String>,
    pub estimated_hours: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedTasks {
    pub generated_tasks: Vec<GeneratedTask>,
    pub count: u32,
    pub generated_at: Option<String>,
}

/// Response of `GET /projects/{id}/analytics`.
///
/// The backend computes these; the nested blocks stay loosely typed because
/// their shape is still moving on the server side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectAnalytics {
    pub project_id: i64,
    pub progress: f64,
    pub tasks_summary: Value,
    pub time_tracking: Value,
    pub budget_tracking: Value,
    pub predictions: Value,
}
