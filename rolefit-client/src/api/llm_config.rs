//! Persisted LLM settings and server-side chat sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::timestamp;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub id: String,
    pub provider: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub is_active: bool,
    /// ok, error or untested
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LlmConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Outcome of a provider connection test. A failed test is still a 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderTest {
    pub status: String,
    pub model: Option<String>,
    pub response: Option<String>,
    pub provider: Option<String>,
    pub error: Option<String>,
}

impl ProviderTest {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    pub role: ChatRole,
    pub content: String,
    pub model: Option<String>,
    pub provider: Option<String>,
    /// Set when the backend could not reach the provider.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl OutgoingMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            model: None,
            provider: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub status: String,
    pub message: Option<String>,
}

#[derive(Serialize)]
struct ProviderTestQuery<'a> {
    provider: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

pub struct LlmSettings<'a> {
    pub(crate) client: &'a ApiClient,
}

impl LlmSettings<'_> {
    pub async fn get(&self) -> Result<LlmConfig, ApiError> {
        self.client.get(&["llm-config", "config"]).await
    }

    /// Merge `update` into the stored configuration.
    pub async fn save(&self, update: &LlmConfigUpdate) -> Result<LlmConfig, ApiError> {
        self.client.post(&["llm-config", "config"], update).await
    }

    pub async fn test_provider(&self, provider: &str, api_key: Option<&str>, model: Option<&str>) -> Result<ProviderTest, ApiError> {
        let query = ProviderTestQuery { provider, api_key, model };
        self.client.post_query(&["llm-config", "test"], &query).await
    }

    pub async fn chat_history(&self, session_id: &str, limit: Option<u32>) -> Result<Vec<ChatMessage>, ApiError> {
        let segments = ["llm-config", "chat", session_id];
        match limit {
            Some(limit) => self.client.get_with(&segments, &[("limit", limit)]).await,
            None => self.client.get(&segments).await,
        }
    }

    /// Append a message and return the assistant's reply.
    pub async fn send_chat(&self, session_id: &str, message: &OutgoingMessage) -> Result<ChatMessage, ApiError> {
        self.client
            .post(&["llm-config", "chat", session_id], message)
            .await
    }

    pub async fn clear_chat(&self, session_id: &str) -> Result<Acknowledgement, ApiError> {
        let builder = self
            .client
            .request(reqwest::Method::DELETE, &["llm-config", "chat", session_id])?;
        self.client.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failure_reply_decodes() {
        let reply: ChatMessage = serde_json::from_value(serde_json::json!({
            "error": "invalid api key",
            "role": "assistant",
            "content": "Error: invalid api key"
        }))
        .unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert!(reply.error.is_some());
        assert!(reply.created_at.is_none());
    }
}
