//! AI analysis of device telemetry and benchmark results.
//!
//! Analyses may come back with status `"processing"` when the backend runs
//! them asynchronously. The placeholder is returned as-is; fetch the report
//! later with [`Ai::report`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::Listing;
use crate::timestamp;
use crate::transport::ApiClient;

pub const STATUS_PROCESSING: &str = "processing";

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Free-form question in natural language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub analysis_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub id: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    pub analysis_type: String,
    pub title: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    pub conclusions: Option<String>,
    pub recommendations: Option<String>,
    pub status: Option<String>,
}

impl AnalysisResponse {
    pub fn is_processing(&self) -> bool {
        self.status.as_deref() == Some(STATUS_PROCESSING)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: String,
    pub device_id: Option<String>,
    pub analysis_type: String,
    pub title: String,
    pub summary: Option<String>,
    /// Only present on the single-report endpoint.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub conclusions: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
    pub status: Option<String>,
    pub model_used: Option<String>,
    #[serde(default)]
    pub analysis_duration_ms: Option<u64>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Serialize)]
struct DeviceWindow<'a> {
    device_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position_id: Option<&'a str>,
}

impl<'a> DeviceWindow<'a> {
    fn device(device_id: &'a str) -> Self {
        Self {
            device_id,
            seconds: None,
            hours: None,
            position_id: None,
        }
    }
}

pub struct Ai<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Ai<'_> {
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ApiError> {
        self.client.post(&["ai", "analyze"], request).await
    }

    /// Analyze the last `seconds` of telemetry (backend default 60, range 10..=3600).
    pub async fn analyze_metrics(&self, device_id: &str, seconds: Option<u32>) -> Result<AnalysisResponse, ApiError> {
        let query = DeviceWindow {
            seconds,
            ..DeviceWindow::device(device_id)
        };
        self.client.post_query(&["ai", "analyze", "metrics"], &query).await
    }

    pub async fn analyze_benchmark(&self, benchmark_id: &str) -> Result<AnalysisResponse, ApiError> {
        self.client
            .post_empty(&["ai", "analyze", "benchmark", benchmark_id])
            .await
    }

    /// Upgrade advice, optionally against a position's hardware standard.
    pub async fn analyze_upgrade(&self, device_id: &str, position_id: Option<&str>) -> Result<AnalysisResponse, ApiError> {
        let query = DeviceWindow {
            position_id,
            ..DeviceWindow::device(device_id)
        };
        self.client.post_query(&["ai", "analyze", "upgrade"], &query).await
    }

    /// Trend over the last `hours` (backend default 72, range 24..=720).
    pub async fn analyze_trend(&self, device_id: &str, hours: Option<u32>) -> Result<AnalysisResponse, ApiError> {
        let query = DeviceWindow {
            hours,
            ..DeviceWindow::device(device_id)
        };
        self.client.post_query(&["ai", "analyze", "trend"], &query).await
    }

    pub async fn reports(&self, params: &ReportParams) -> Result<Listing<AnalysisReport>, ApiError> {
        self.client.get_with(&["ai", "reports"], params).await
    }

    pub async fn report(&self, id: &str) -> Result<AnalysisReport, ApiError> {
        self.client.get(&["ai", "reports", id]).await
    }
}
