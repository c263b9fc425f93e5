//! Direct access to the backend's LLM providers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProvider {
    pub id: String,
    pub name: String,
    pub default_model: String,
    #[serde(default)]
    pub free: bool,
    #[serde(default)]
    pub models: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub provider: String,
    #[serde(default)]
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceAnalysisRequest {
    pub hardware_info: serde_json::Value,
    pub performance_data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceAnalysis {
    pub bottleneck: String,
    pub score_loss_percent: i32,
    #[serde(default)]
    pub upgrade_priority: Vec<String>,
    pub estimated_improvement: String,
    pub reasoning: String,
    pub model: String,
    pub provider: String,
    #[serde(default)]
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCheck {
    pub status: String,
    pub model: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmHealth {
    pub providers: Vec<LlmProvider>,
    /// Check outcome keyed by provider id.
    pub status: HashMap<String, ProviderCheck>,
    pub default_provider: String,
}

#[derive(Serialize)]
struct SimpleChatQuery<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'a str>,
}

pub struct Llm<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Llm<'_> {
    pub async fn providers(&self) -> Result<Vec<LlmProvider>, ApiError> {
        self.client.get(&["llm", "providers"]).await
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.client.post(&["llm", "chat"], request).await
    }

    /// One-shot chat with provider defaults; `usage` is usually absent.
    pub async fn simple_chat(&self, message: &str, provider: Option<&str>) -> Result<ChatResponse, ApiError> {
        self.client
            .post_query(&["llm", "chat", "simple"], &SimpleChatQuery { message, provider })
            .await
    }

    pub async fn analyze(&self, request: &PerformanceAnalysisRequest) -> Result<PerformanceAnalysis, ApiError> {
        self.client.post(&["llm", "analyze"], request).await
    }

    /// Test every provider with a short prompt. Slow: one round-trip per provider.
    pub async fn test(&self) -> Result<LlmHealth, ApiError> {
        self.client.get(&["llm", "test"]).await
    }

    pub async fn free_providers(&self) -> Result<Vec<LlmProvider>, ApiError> {
        let providers = self.providers().await?;
        Ok(providers.into_iter().filter(|p| p.free).collect())
    }
}
