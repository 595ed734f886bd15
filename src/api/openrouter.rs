//! Primary tier: Cerebras via the OpenRouter routing endpoint
//!
//! Routing is pinned to the single Cerebras backend with OpenRouter's own
//! cross-provider fallbacks disabled; fallback policy lives entirely in the
//! orchestrator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiError, ChatRequest, ProviderClient, ProviderTier};

/// OpenRouter tier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// API key; empty means the tier fails locally without a network call.
    pub api_key: String,
    /// Model to route.
    pub model: String,
    /// Base URL (default: https://openrouter.ai/api/v1).
    pub base_url: Option<String>,
    /// Maximum tokens for the completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in seconds. Short: this is the fast tier.
    pub timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "openai/gpt-oss-120b".to_string(),
            base_url: None,
            max_tokens: 300,
            temperature: 0.7,
            timeout_secs: 5,
        }
    }
}

/// Cerebras-pinned OpenRouter client.
pub struct OpenRouterProvider {
    config: OpenRouterConfig,
    client: Client,
}

impl OpenRouterProvider {
    pub fn new(config: OpenRouterConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or("https://openrouter.ai/api/v1")
    }

    fn build_body(&self, request: &ChatRequest) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user }
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "provider": {
                "order": ["Cerebras"],
                "allow_fallbacks": false
            }
        })
    }

    fn parse_body(&self, body: Value) -> Result<String, ApiError> {
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ApiError::Format("missing choices[0].message.content".to_string()))
    }
}

#[async_trait]
impl ProviderClient for OpenRouterProvider {
    async fn generate(&self, request: &ChatRequest) -> Result<String, ApiError> {
        if self.config.api_key.is_empty() {
            return Err(ApiError::CredentialMissing {
                provider: "OpenRouter",
            });
        }

        let url = format!("{}/chat/completions", self.base_url());
        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("HTTP-Referer", "https://etherea.ai")
            .header("X-Title", "Etherea")
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
        ProviderTier::Cerebras
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenRouterProvider {
        OpenRouterProvider::new(OpenRouterConfig {
            api_key: "sk-or-test".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn body_pins_cerebras_with_fallbacks_disabled() {
        let body = provider().build_body(&ChatRequest {
            system: "sys".to_string(),
            user: "usr".to_string(),
        });

        assert_eq!(body["model"], "openai/gpt-oss-120b");
        assert_eq!(body["max_tokens"], 300);
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(body["provider"]["order"], json!(["Cerebras"]));
        assert_eq!(body["provider"]["allow_fallbacks"], json!(false));
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "usr");
    }

    #[test]
    fn parses_completion_content() {
        let body = json!({
            "choices": [ { "message": { "content": "  a prompt  " } } ]
        });
        assert_eq!(provider().parse_body(body).unwrap(), "a prompt");
    }

    #[test]
    fn missing_content_is_a_format_error() {
        let body = json!({ "choices": [] });
        assert!(matches!(
            provider().parse_body(body),
            Err(ApiError::Format(_))
        ));
    }

    #[tokio::test]
    async fn empty_key_fails_without_network() {
        let provider = OpenRouterProvider::new(OpenRouterConfig::default());
        let result = provider
            .generate(&ChatRequest {
                system: String::new(),
                user: String::new(),
            })
            .await;

        assert!(matches!(
            result,
            Err(ApiError::CredentialMissing { provider: "OpenRouter" })
        ));
    }
}
