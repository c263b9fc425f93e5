//! Alarm rules and raised alarms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::timestamp;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmRule {
    pub id: String,
    pub name: String,
    pub alarm_type: String,
    pub condition: String,
    pub threshold: Option<f64>,
    pub enabled: bool,
    #[serde(default)]
    pub notification_channels: Option<Vec<String>>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Rules are replaced whole on update, so create and update share a body.
#[derive(Debug, Clone, Serialize)]
pub struct AlarmRuleSpec {
    pub name: String,
    pub alarm_type: String,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notification_channels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    pub id: String,
    pub rule_id: Option<String>,
    pub device_id: Option<String>,
    pub alarm_type: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub is_resolved: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AlarmParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_resolved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmCheck {
    /// Number of new alarms raised by this sweep.
    pub checked: u32,
    pub message: String,
}

pub struct Alarms<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Alarms<'_> {
    pub async fn rules(&self, enabled: Option<bool>) -> Result<Vec<AlarmRule>, ApiError> {
        match enabled {
            Some(enabled) => self.client.get_with(&["alarms", "rules"], &[("enabled", enabled)]).await,
            None => self.client.get(&["alarms", "rules"]).await,
        }
    }

    pub async fn create_rule(&self, rule: &AlarmRuleSpec) -> Result<AlarmRule, ApiError> {
        self.client.post(&["alarms", "rules"], rule).await
    }

    pub async fn update_rule(&self, id: &str, rule: &AlarmRuleSpec) -> Result<AlarmRule, ApiError> {
        self.client.put(&["alarms", "rules", id], rule).await
    }

    pub async fn delete_rule(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&["alarms", "rules", id]).await
    }

    /// One page of alarms, newest first. The backend returns a bare array.
    pub async fn list(&self, params: &AlarmParams) -> Result<Vec<Alarm>, ApiError> {
        self.client.get_with(&["alarms"], params).await
    }

    pub async fn resolve(&self, id: &str) -> Result<Alarm, ApiError> {
        self.client.post_empty(&["alarms", id, "resolve"]).await
    }

    /// Trigger a server-side sweep for offline devices and failed tests.
    pub async fn check(&self) -> Result<AlarmCheck, ApiError> {
        self.client.post_empty(&["alarms", "check"]).await
    }
}
