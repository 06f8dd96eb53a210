//! REST client for the platform's task backend.
//!
//! The backend exposes three tables over a PostgREST-style interface:
//! `agent_tasks` (the work queue), `hr_employees` (profiles enriched with
//! HR context) and `position_requirements` (per-role skill requirements).
//! Every request carries the service key as both `apikey` and bearer token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::employee::EmployeeProfile;
use crate::models::requirements::PositionRequirements;

pub mod worker;

/// The one queue entry type this agent consumes.
pub const TASK_TYPE: &str = "process_employee_profile";

const REQUEST_TIMEOUT_SECS: u64 = 30;

// ─────────────────────────────────────────────────────────────────────────────
// Wire models
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// One row of the `agent_tasks` queue.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentTask {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    pub data: TaskData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskData {
    pub employee_id: String,
}

/// One row of `hr_employees`: the profile plus the HR context around it.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeRecord {
    pub id: String,
    #[serde(flatten)]
    pub profile: EmployeeProfile,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub documents: Vec<EmployeeDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeDocument {
    pub name: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub url: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend seam
// ─────────────────────────────────────────────────────────────────────────────

/// The queue and HR lookups the worker drives.
///
/// `TaskClient` is the production backend; tests script their own
/// implementations to exercise the polling loop without a live backend.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Pending profile-processing tasks, as the queue returns them.
    async fn fetch_pending_tasks(&self) -> Result<Vec<AgentTask>, AppError>;

    /// The employee row a task points at. A missing row is `NotFound`.
    async fn fetch_employee(&self, employee_id: &str) -> Result<EmployeeRecord, AppError>;

    /// Requirements for a target role. A missing row is `NotFound` so the
    /// worker fails the task instead of analyzing against an empty set.
    async fn fetch_position_requirements(
        &self,
        role: &str,
    ) -> Result<PositionRequirements, AppError>;

    /// Moves a task through the queue: pending → in_progress → completed or
    /// failed. `result` lands in the task's `result` column when given.
    async fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        result: Option<Value>,
    ) -> Result<(), AppError>;

    /// Stamps the employee row after a successful run.
    async fn mark_employee_processed(&self, employee_id: &str) -> Result<(), AppError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TaskClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TaskClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TaskBackend for TaskClient {
    async fn fetch_pending_tasks(&self) -> Result<Vec<AgentTask>, AppError> {
        let type_filter = format!("eq.{TASK_TYPE}");
        let rows = self
            .get_rows(
                "agent_tasks",
                &[
                    ("select", "*"),
                    ("type", &type_filter),
                    ("status", "eq.pending"),
                ],
            )
            .await?;

        Ok(decode_tasks(rows))
    }

    async fn fetch_employee(&self, employee_id: &str) -> Result<EmployeeRecord, AppError> {
        let id_filter = format!("eq.{employee_id}");
        let rows = self
            .get_rows("hr_employees", &[("select", "*"), ("id", &id_filter)])
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Employee '{employee_id}' not found")))?;
        serde_json::from_value(row)
            .map_err(|e| AppError::Tasks(format!("Malformed hr_employees row: {e}")))
    }

    async fn fetch_position_requirements(
        &self,
        role: &str,
    ) -> Result<PositionRequirements, AppError> {
        let role_filter = format!("eq.{role}");
        let rows = self
            .get_rows(
                "position_requirements",
                &[("select", "*"), ("role", &role_filter)],
            )
            .await?;

        let row = rows.into_iter().next().ok_or_else(|| {
            AppError::NotFound(format!("No position requirements stored for role '{role}'"))
        })?;
        serde_json::from_value(row)
            .map_err(|e| AppError::Tasks(format!("Malformed position_requirements row: {e}")))
    }

    async fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        result: Option<Value>,
    ) -> Result<(), AppError> {
        let mut body = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339(),
        });
        if let Some(result) = result {
            body["result"] = result;
        }

        let id_filter = format!("eq.{task_id}");
        self.patch("agent_tasks", &[("id", &id_filter)], &body).await
    }

    async fn mark_employee_processed(&self, employee_id: &str) -> Result<(), AppError> {
        let body = json!({
            "status": "processed",
            "updated_at": Utc::now().to_rfc3339(),
        });

        let id_filter = format!("eq.{employee_id}");
        self.patch("hr_employees", &[("id", &id_filter)], &body).await
    }
}

impl TaskClient {
    async fn get_rows(&self, table: &str, query: &[(&str, &str)]) -> Result<Vec<Value>, AppError> {
        let url = self.table_url(table);
        debug!("GET {url} {query:?}");

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("apikey", &self.api_key)
            .header("authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| AppError::Tasks(format!("GET {table} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Tasks(format!(
                "GET {table} returned {status}: {body}"
            )));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| AppError::Tasks(format!("GET {table} returned a non-array body: {e}")))
    }

    async fn patch(
        &self,
        table: &str,
        query: &[(&str, &str)],
        body: &Value,
    ) -> Result<(), AppError> {
        let url = self.table_url(table);
        debug!("PATCH {url} {query:?}");

        let response = self
            .client
            .patch(&url)
            .query(query)
            .header("apikey", &self.api_key)
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Tasks(format!("PATCH {table} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Tasks(format!(
                "PATCH {table} returned {status}: {body}"
            )));
        }

        Ok(())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }
}

/// Decodes queue rows one by one. A malformed row is logged and skipped so it
/// cannot starve the rest of the queue; it stays `pending` in the backend for
/// someone to inspect.
fn decode_tasks(rows: Vec<Value>) -> Vec<AgentTask> {
    let mut tasks = Vec::with_capacity(rows.len());
    for row in rows {
        let row_id = row.get("id").and_then(Value::as_str).map(str::to_string);
        match serde_json::from_value::<AgentTask>(row) {
            Ok(task) => tasks.push(task),
            Err(e) => warn!(
                "Skipping malformed agent_tasks row {}: {e}",
                row_id.as_deref().unwrap_or("<no id>")
            ),
        }
    }
    tasks
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
