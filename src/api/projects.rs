//! Project, task, KPI, AI-helper, analytics, and health endpoints.
//!
//! Create/update bodies are accepted as any `Serialize` value: the backend
//! decides which fields it honors, and views send partial updates.

#[cfg(test)]
#[path = "projects_test.rs"]
mod projects_test;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::gateway::ApiGateway;
use crate::types::{GeneratedTasks, Kpi, Project, ProjectAnalytics, SmartObjective, Task};

pub(crate) const PROJECTS_PATH: &str = "/projects";
pub(crate) const SMART_OBJECTIVE_PATH: &str = "/projects/generate-smart-objective";
pub(crate) const HEALTH_PATH: &str = "/health";

pub(crate) fn projects_endpoint(user_id: Option<i64>) -> String {
    match user_id {
        Some(id) => format!("{PROJECTS_PATH}?user_id={id}"),
        None => PROJECTS_PATH.to_owned(),
    }
}

pub(crate) fn project_endpoint(project_id: i64) -> String {
    format!("/projects/{project_id}")
}

pub(crate) fn project_tasks_endpoint(project_id: i64) -> String {
    format!("/projects/{project_id}/tasks")
}

pub(crate) fn task_endpoint(task_id: i64) -> String {
    format!("/tasks/{task_id}")
}

pub(crate) fn project_kpis_endpoint(project_id: i64) -> String {
    format!("/projects/{project_id}/kpis")
}

pub(crate) fn kpi_endpoint(kpi_id: i64) -> String {
    format!("/kpis/{kpi_id}")
}

pub(crate) fn generate_tasks_endpoint(project_id: i64) -> String {
    format!("/projects/{project_id}/generate-tasks")
}

pub(crate) fn analytics_endpoint(project_id: i64) -> String {
    format!("/projects/{project_id}/analytics")
}

impl ApiGateway {
    // =========================================================================
    // PROJECTS
    // =========================================================================

    /// List projects, optionally only those owned by `user_id`.
    pub async fn projects(&self, user_id: Option<i64>) -> Result<Vec<Project>, ApiError> {
        self.get(&projects_endpoint(user_id)).await
    }

    pub async fn project(&self, project_id: i64) -> Result<Project, ApiError> {
        self.get(&project_endpoint(project_id)).await
    }

    pub async fn create_project<B: Serialize + ?Sized>(&self, project: &B) -> Result<Project, ApiError> {
        self.post(PROJECTS_PATH, project).await
    }

    pub async fn update_project<B: Serialize + ?Sized>(&self, project_id: i64, changes: &B) -> Result<Project, ApiError> {
        self.put(&project_endpoint(project_id), changes).await
    }

    pub async fn delete_project(&self, project_id: i64) -> Result<(), ApiError> {
        self.delete(&project_endpoint(project_id)).await
    }

    // =========================================================================
    // TASKS
    // =========================================================================

    /// Tasks of a project, in the server's `order_index` order.
    pub async fn project_tasks(&self, project_id: i64) -> Result<Vec<Task>, ApiError> {
        self.get(&project_tasks_endpoint(project_id)).await
    }

    pub async fn create_task<B: Serialize + ?Sized>(&self, project_id: i64, task: &B) -> Result<Task, ApiError> {
        self.post(&project_tasks_endpoint(project_id), task).await
    }

    pub async fn update_task<B: Serialize + ?Sized>(&self, task_id: i64, changes: &B) -> Result<Task, ApiError> {
        self.put(&task_endpoint(task_id), changes).await
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
        self.delete(&task_endpoint(task_id)).await
    }

    // =========================================================================
    // KPIS
    // =========================================================================

    pub async fn project_kpis(&self, project_id: i64) -> Result<Vec<Kpi>, ApiError> {
        self.get(&project_kpis_endpoint(project_id)).await
    }

    pub async fn create_kpi<B: Serialize + ?Sized>(&self, project_id: i64, kpi: &B) -> Result<Kpi, ApiError> {
        self.post(&project_kpis_endpoint(project_id), kpi).await
    }

    pub async fn update_kpi<B: Serialize + ?Sized>(&self, kpi_id: i64, changes: &B) -> Result<Kpi, ApiError> {
        self.put(&kpi_endpoint(kpi_id), changes).await
    }

    // =========================================================================
    // AI HELPERS
    // =========================================================================

    /// Ask the backend to turn a free-text description into a SMART objective.
    pub async fn generate_smart_objective(&self, description: &str) -> Result<SmartObjective, ApiError> {
        self.post(SMART_OBJECTIVE_PATH, &serde_json::json!({ "description": description })).await
    }

    /// Ask the backend to generate (and persist) tasks for an objective.
    pub async fn generate_tasks(&self, project_id: i64, objective: &str) -> Result<GeneratedTasks, ApiError> {
        self.post(&generate_tasks_endpoint(project_id), &serde_json::json!({ "objective": objective })).await
    }

    // =========================================================================
    // ANALYTICS / HEALTH
    // =========================================================================

    pub async fn project_analytics(&self, project_id: i64) -> Result<ProjectAnalytics, ApiError> {
        self.get(&analytics_endpoint(project_id)).await
    }

    /// Probe `GET /health`; the body is returned as-is.
    pub async fn health(&self) -> Result<Value, ApiError> {
        self.get(HEALTH_PATH).await
    }
}
