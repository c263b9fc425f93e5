use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::Page;
use crate::timestamp;
use crate::transport::ApiClient;

/// Organizational role; results are judged against its hardware standard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub position_name: String,
    pub position_code: String,
    pub department: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PositionCreate {
    pub position_name: String,
    pub position_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PositionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PositionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

pub struct Positions<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Positions<'_> {
    pub async fn list(&self, params: &PositionParams) -> Result<Page<Position>, ApiError> {
        self.client.get_with(&["positions"], params).await
    }

    pub async fn get(&self, id: &str) -> Result<Position, ApiError> {
        self.client.get(&["positions", id]).await
    }

    pub async fn create(&self, position: &PositionCreate) -> Result<Position, ApiError> {
        self.client.post(&["positions"], position).await
    }

    pub async fn update(&self, id: &str, patch: &PositionUpdate) -> Result<Position, ApiError> {
        self.client.put(&["positions", id], patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&["positions", id]).await
    }
}
