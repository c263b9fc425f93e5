use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::Page;
use crate::timestamp;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub id: String,
    pub script_name: String,
    pub script_code: String,
    #[serde(default)]
    pub position_ids: Vec<String>,
    pub software_id: Option<String>,
    /// START, OPERATION, RENDER, STRESS or BENCHMARK
    pub script_type: Option<String>,
    /// JSON document interpreted by the agent.
    pub script_content: String,
    pub expected_duration: Option<u32>,
    pub is_active: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptCreate {
    pub script_name: String,
    pub script_code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub position_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_type: Option<String>,
    pub script_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_duration: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_id: Option<String>,
}

pub struct Scripts<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Scripts<'_> {
    pub async fn list(&self, params: &ScriptParams) -> Result<Page<Script>, ApiError> {
        self.client.get_with(&["scripts"], params).await
    }

    pub async fn get(&self, id: &str) -> Result<Script, ApiError> {
        self.client.get(&["scripts", id]).await
    }

    pub async fn create(&self, script: &ScriptCreate) -> Result<Script, ApiError> {
        self.client.post(&["scripts"], script).await
    }

    pub async fn update(&self, id: &str, patch: &ScriptUpdate) -> Result<Script, ApiError> {
        self.client.put(&["scripts", id], patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&["scripts", id]).await
    }
}
