use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::Listing;
use crate::timestamp;
use crate::transport::ApiClient;

/// Dashboard shortcut tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCard {
    pub id: String,
    pub card_key: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub route: Option<String>,
    pub is_visible: bool,
    pub sort_order: i32,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCardCreate {
    pub card_key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    pub is_visible: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeatureCardUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

pub struct FeatureCards<'a> {
    pub(crate) client: &'a ApiClient,
}

impl FeatureCards<'_> {
    pub async fn list(&self) -> Result<Listing<FeatureCard>, ApiError> {
        self.client.get(&["feature-cards"]).await
    }

    pub async fn get(&self, id: &str) -> Result<FeatureCard, ApiError> {
        self.client.get(&["feature-cards", id]).await
    }

    pub async fn create(&self, card: &FeatureCardCreate) -> Result<FeatureCard, ApiError> {
        self.client.post(&["feature-cards"], card).await
    }

    pub async fn update(&self, id: &str, patch: &FeatureCardUpdate) -> Result<FeatureCard, ApiError> {
        self.client.put(&["feature-cards", id], patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&["feature-cards", id]).await
    }

    /// Persist a new display order. The body is the bare id array; the
    /// backend answers with the cards in their new order.
    pub async fn reorder(&self, card_ids: &[String]) -> Result<Listing<FeatureCard>, ApiError> {
        self.client.put(&["feature-cards", "reorder"], card_ids).await
    }
}
