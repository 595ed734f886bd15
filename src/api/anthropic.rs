//! Secondary tier: Claude via the Anthropic messages endpoint
//!
//! Higher latency, higher quality; tried exactly once after the primary
//! budget is exhausted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiError, ChatRequest, ProviderClient, ProviderTier};

/// Anthropic tier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API key; empty means the tier fails locally without a network call.
    pub api_key: String,
    /// Model to use.
    pub model: String,
    /// Base URL (default: https://api.anthropic.com/v1).
    pub base_url: Option<String>,
    /// Maximum tokens for the completion.
    pub max_tokens: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-sonnet-4-5".to_string(),
            base_url: None,
            max_tokens: 300,
            timeout_secs: 30,
        }
    }
}

/// Direct Anthropic messages client.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or("https://api.anthropic.com/v1")
    }

    fn build_body(&self, request: &ChatRequest) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": request.system,
            "messages": [
                { "role": "user", "content": request.user }
            ]
        })
    }

    fn parse_body(&self, body: Value) -> Result<String, ApiError> {
        body["content"][0]["text"]
            .as_str()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| ApiError::Format("missing content[0].text".to_string()))
    }
}

#[async_trait]
impl ProviderClient for AnthropicProvider {
    async fn generate(&self, request: &ChatRequest) -> Result<String, ApiError> {
        if self.config.api_key.is_empty() {
            return Err(ApiError::CredentialMissing {
                provider: "Anthropic",
            });
        }

        let url = format!("{}/messages", self.base_url());
        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        let body: Value = response.json().await?;
        self.parse_body(body)
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::ClaudeFallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(AnthropicConfig {
            api_key: "sk-ant-test".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn body_carries_system_field_and_single_user_message() {
        let body = provider().build_body(&ChatRequest {
            system: "sys".to_string(),
            user: "usr".to_string(),
        });

        assert_eq!(body["model"], "claude-sonnet-4-5");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "usr");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn parses_message_text() {
        let body = json!({
            "content": [ { "type": "text", "text": "a prompt" } ]
        });
        assert_eq!(provider().parse_body(body).unwrap(), "a prompt");
    }

    #[test]
    fn missing_text_is_a_format_error() {
        let body = json!({ "content": [] });
        assert!(matches!(
            provider().parse_body(body),
            Err(ApiError::Format(_))
        ));
    }

    #[tokio::test]
    async fn empty_key_fails_without_network() {
        let provider = AnthropicProvider::new(AnthropicConfig::default());
        let result = provider
            .generate(&ChatRequest {
                system: String::new(),
                user: String::new(),
            })
            .await;

        assert!(matches!(
            result,
            Err(ApiError::CredentialMissing { provider: "Anthropic" })
        ));
    }
}
