//! Benchmark results, per-device statistics and multi-device comparison.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::Page;
use crate::timestamp;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub task_id: Option<String>,
    pub device_id: String,
    pub test_type: Option<String>,
    /// passed, failed, warning or partial
    pub test_status: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    #[serde(flatten)]
    pub scores: Scores,
    pub is_standard_met: Option<bool>,
    pub standard_id: Option<String>,
    pub fail_reasons: Option<serde_json::Value>,
    pub performance_summary: Option<serde_json::Value>,
    pub bottleneck_type: Option<String>,
    pub bottleneck_detail: Option<serde_json::Value>,
    pub upgrade_suggestion: Option<serde_json::Value>,
    pub result_file_path: Option<String>,
    pub log_file_path: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub overall_score: Option<f64>,
    pub cpu_score: Option<f64>,
    pub gpu_score: Option<f64>,
    pub memory_score: Option<f64>,
    pub disk_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_standard_met: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// One sample of the software metrics recorded while a result was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetric {
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub timestamp: Option<DateTime<Utc>>,
    pub software_name: Option<String>,
    pub cpu_percent: Option<f64>,
    pub memory_mb: Option<f64>,
    pub gpu_percent: Option<f64>,
    pub gpu_memory_mb: Option<f64>,
    pub disk_read_mbps: Option<f64>,
    pub disk_write_mbps: Option<f64>,
    pub fps: Option<f64>,
    pub latency_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTrendDirection {
    Improving,
    Declining,
    Stable,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicePerformanceSummary {
    pub device_id: String,
    pub device_name: String,
    pub total_tests: u32,
    pub latest_score: Option<f64>,
    pub average_score: Option<f64>,
    /// `None` when the device has never been tested.
    pub trend: Option<ScoreTrendDirection>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_test_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceComparison {
    pub device_id: String,
    pub device_name: String,
    pub cpu_model: Option<String>,
    pub gpu_model: Option<String>,
    pub ram_total_gb: Option<f64>,
    pub latest_result: Option<ComparedResult>,
    pub statistics: ComparisonStatistics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparedResult {
    #[serde(flatten)]
    pub scores: Scores,
    /// Weighted overall recomputed by the backend from the component scores.
    pub calculated_overall: Option<f64>,
    pub test_status: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub test_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonStatistics {
    pub average_score: Option<f64>,
    pub max_score: Option<f64>,
    pub min_score: Option<f64>,
    #[serde(default)]
    pub test_count: u32,
}

pub struct Results<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Results<'_> {
    pub async fn list(&self, params: &ResultParams) -> Result<Page<TestResult>, ApiError> {
        self.client.get_with(&["results"], params).await
    }

    pub async fn get(&self, id: &str) -> Result<TestResult, ApiError> {
        self.client.get(&["results", id]).await
    }

    /// Empty when no execution was recorded for the result.
    pub async fn metrics(&self, result_id: &str) -> Result<Vec<ResultMetric>, ApiError> {
        self.client.get(&["results", result_id, "metrics"]).await
    }

    pub async fn device_statistics(&self, device_id: &str) -> Result<DevicePerformanceSummary, ApiError> {
        self.client
            .get(&["results", "statistics", "device", device_id])
            .await
    }

    /// Side-by-side comparison. Unknown ids are silently dropped by the backend.
    pub async fn compare(&self, device_ids: &[String]) -> Result<Vec<DeviceComparison>, ApiError> {
        let joined = device_ids.join(",");
        self.client
            .get_with(&["results", "compare"], &[("device_ids", joined.as_str())])
            .await
    }
}
