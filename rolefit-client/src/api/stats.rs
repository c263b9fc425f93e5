//! Dashboard aggregates. All computed server-side.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_devices: u32,
    pub online_devices: u32,
    pub offline_devices: u32,
    pub testing_devices: u32,
    pub total_tasks: u32,
    pub pending_tasks: u32,
    pub running_tasks: u32,
    pub completed_tasks: u32,
    pub total_tests: u32,
    pub passed_tests: u32,
    pub failed_tests: u32,
    #[serde(default)]
    pub average_score: f64,
}

impl DashboardSummary {
    /// Share of tests that passed, `None` before any test ran.
    pub fn pass_rate(&self) -> Option<f64> {
        (self.total_tests > 0).then(|| f64::from(self.passed_tests) / f64::from(self.total_tests))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceStatusDistribution {
    pub online: u32,
    pub offline: u32,
    pub testing: u32,
    #[serde(default)]
    pub error: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentDeviceCount {
    pub department: String,
    pub count: u32,
    pub online_count: u32,
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTrendPoint {
    /// Day bucket as the backend formats it (`YYYY-MM-DD`).
    pub date: String,
    pub average_score: f64,
    pub test_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionCompliance {
    pub position: String,
    pub total_devices: u32,
    pub compliant_devices: u32,
    pub compliance_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub device_id: String,
    pub device_name: String,
    pub score: Option<f64>,
    pub cpu: Option<String>,
    pub gpu: Option<String>,
}

pub struct Stats<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Stats<'_> {
    pub async fn dashboard(&self) -> Result<DashboardSummary, ApiError> {
        self.client.get(&["stats", "dashboard"]).await
    }

    pub async fn status_distribution(&self) -> Result<DeviceStatusDistribution, ApiError> {
        self.client
            .get(&["stats", "devices", "status-distribution"])
            .await
    }

    pub async fn by_department(&self) -> Result<Vec<DepartmentDeviceCount>, ApiError> {
        self.client.get(&["stats", "devices", "by-department"]).await
    }

    pub async fn score_trend(&self, days: Option<u32>) -> Result<Vec<ScoreTrendPoint>, ApiError> {
        let segments = ["stats", "scores", "trend"];
        match days {
            Some(days) => self.client.get_with(&segments, &[("days", days)]).await,
            None => self.client.get(&segments).await,
        }
    }

    pub async fn position_compliance(&self) -> Result<Vec<PositionCompliance>, ApiError> {
        self.client.get(&["stats", "positions", "compliance"]).await
    }

    /// Top devices by overall score; the backend caps `limit` at 50.
    pub async fn leaderboard(&self, limit: Option<u32>) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let segments = ["stats", "leaderboard", "devices"];
        match limit {
            Some(limit) => self.client.get_with(&segments, &[("limit", limit)]).await,
            None => self.client.get(&segments).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_rate() {
        let mut summary = DashboardSummary::default();
        assert_eq!(summary.pass_rate(), None);
        summary.total_tests = 4;
        summary.passed_tests = 3;
        assert_eq!(summary.pass_rate(), Some(0.75));
    }
}
