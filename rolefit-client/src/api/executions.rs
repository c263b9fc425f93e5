//! Script executions, plus the agent-side endpoints that drive them.
//!
//! The agent endpoints are what a benchmarking agent calls while it runs a
//! task: poll for work, open an execution, stream metrics, close it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::Page;
use crate::timestamp;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: String,
    pub task_id: Option<String>,
    pub script_id: Option<String>,
    pub device_id: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    /// -1 while the execution is still running.
    #[serde(default)]
    pub exit_code: i32,
    pub error_message: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Execution {
    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// Device with a heartbeat in the last few minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineDevice {
    pub id: String,
    pub device_name: String,
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStarted {
    pub execution_id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionCompleted {
    pub execution_id: String,
    pub success: bool,
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsAccepted {
    pub success: bool,
    pub count: u32,
}

/// Per-process sample reported by the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoftwareSample {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_memory_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_read_mbps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_write_mbps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionOutcome {
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_data: Option<Vec<SoftwareSample>>,
}

#[derive(Serialize)]
struct StartQuery<'a> {
    script_id: &'a str,
    device_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_id: Option<&'a str>,
}

pub struct Executions<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Executions<'_> {
    pub async fn list(&self, params: &ExecutionParams) -> Result<Page<Execution>, ApiError> {
        self.client.get_with(&["executions"], params).await
    }

    pub async fn get(&self, id: &str) -> Result<Execution, ApiError> {
        self.client.get(&["executions", id]).await
    }

    pub async fn create(&self, execution: &ExecutionCreate) -> Result<Execution, ApiError> {
        self.client.post(&["executions"], execution).await
    }

    pub async fn update(&self, id: &str, patch: &ExecutionUpdate) -> Result<Execution, ApiError> {
        self.client.put(&["executions", id], patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&["executions", id]).await
    }
}

pub struct Agent<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Agent<'_> {
    pub async fn online_devices(&self) -> Result<Vec<OnlineDevice>, ApiError> {
        self.client.get(&["agent", "devices", "online"]).await
    }

    /// Tasks the backend wants `device_id` to run next. Entries are passed
    /// through as the backend shapes them.
    pub async fn pending_tasks(&self, device_id: &str) -> Result<Vec<serde_json::Value>, ApiError> {
        self.client
            .get_with(&["agent", "tasks", "pending"], &[("device_id", device_id)])
            .await
    }

    pub async fn start(&self, script_id: &str, device_id: &str, task_id: Option<&str>) -> Result<ExecutionStarted, ApiError> {
        let query = StartQuery { script_id, device_id, task_id };
        self.client
            .post_query(&["agent", "executions", "start"], &query)
            .await
    }

    pub async fn complete(&self, execution_id: &str, outcome: &ExecutionOutcome) -> Result<ExecutionCompleted, ApiError> {
        tracing::debug!(execution = execution_id, exit_code = outcome.exit_code, "closing execution");
        self.client
            .put(&["agent", "executions", execution_id, "complete"], outcome)
            .await
    }

    pub async fn submit_metrics(&self, execution_id: &str, samples: &[SoftwareSample]) -> Result<MetricsAccepted, ApiError> {
        self.client
            .post(&["agent", "executions", execution_id, "metrics"], samples)
            .await
    }
}
