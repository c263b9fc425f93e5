//! Test tasks: scheduled work targeting devices by id, department or position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::Page;
use crate::timestamp;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Immediate,
    Scheduled,
    Recurring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub task_name: String,
    /// benchmark, simulation, full, custom
    pub task_type: String,
    pub task_status: TaskStatus,
    #[serde(default)]
    pub target_device_ids: Vec<String>,
    #[serde(default)]
    pub target_departments: Vec<String>,
    #[serde(default)]
    pub target_positions: Vec<String>,
    pub test_script_id: Option<String>,
    pub test_duration_seconds: Option<u32>,
    #[serde(default = "default_sample_interval")]
    pub sample_interval_ms: u32,
    pub assigned_agent_id: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub completed_at: Option<DateTime<Utc>>,
    pub schedule_type: Option<ScheduleType>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub cron_expression: Option<String>,
    pub created_by: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

fn default_sample_interval() -> u32 {
    1000
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskCreate {
    pub task_name: String,
    pub task_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_device_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_departments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_positions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_script_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_interval_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<ScheduleType>,
    /// One-shot run time, used with [`ScheduleType::Scheduled`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Recurrence, used with [`ScheduleType::Recurring`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_device_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_duration_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    device_ids: &'a [String],
}

#[derive(Serialize)]
struct CancelRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

pub struct Tasks<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Tasks<'_> {
    pub async fn list(&self, params: &TaskParams) -> Result<Page<Task>, ApiError> {
        self.client.get_with(&["tasks"], params).await
    }

    pub async fn get(&self, id: &str) -> Result<Task, ApiError> {
        self.client.get(&["tasks", id]).await
    }

    pub async fn create(&self, task: &TaskCreate) -> Result<Task, ApiError> {
        self.client.post(&["tasks"], task).await
    }

    pub async fn update(&self, id: &str, patch: &TaskUpdate) -> Result<Task, ApiError> {
        self.client.put(&["tasks", id], patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&["tasks", id]).await
    }

    /// Dispatch the task to `device_ids`. Admission is the backend's call:
    /// a busy device comes back as a 409 status error.
    pub async fn execute(&self, id: &str, device_ids: &[String]) -> Result<Task, ApiError> {
        tracing::info!(task = id, devices = device_ids.len(), "dispatching task");
        self.client
            .post(&["tasks", id, "execute"], &ExecuteRequest { device_ids })
            .await
    }

    /// Best-effort cancel; the task may already have finished.
    pub async fn cancel(&self, id: &str, reason: Option<&str>) -> Result<Task, ApiError> {
        self.client
            .post(&["tasks", id, "cancel"], &CancelRequest { reason })
            .await
    }
}
