//! Provider abstraction for the two LLM tiers

mod anthropic;
mod openrouter;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use openrouter::{OpenRouterConfig, OpenRouterProvider};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider-level failure. `detail` strings may embed upstream text and must
/// pass through [`crate::extract::sanitize_error`] before leaving the crate.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{provider} API key not set")]
    CredentialMissing { provider: &'static str },

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("unexpected response format: {0}")]
    Format(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport("request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Transport(format!("connection failed: {}", err))
        } else if err.is_decode() {
            ApiError::Format(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Which tier satisfied a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderTier {
    #[serde(rename = "cerebras")]
    Cerebras,
    #[serde(rename = "claude-fallback")]
    ClaudeFallback,
}

impl ProviderTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderTier::Cerebras => "cerebras",
            ProviderTier::ClaudeFallback => "claude-fallback",
        }
    }
}

/// One compiled generation request: a system prompt and a single user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
}

/// Seam between the orchestrator and a concrete LLM backend.
///
/// Implementations return the raw completion text; extraction and
/// sanitization happen in the orchestrator.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn generate(&self, request: &ChatRequest) -> Result<String, ApiError>;
    fn tier(&self) -> ProviderTier;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_tags_match_wire_values() {
        assert_eq!(ProviderTier::Cerebras.as_str(), "cerebras");
        assert_eq!(ProviderTier::ClaudeFallback.as_str(), "claude-fallback");
        assert_eq!(
            serde_json::to_value(ProviderTier::ClaudeFallback).unwrap(),
            serde_json::json!("claude-fallback")
        );
    }

    #[test]
    fn credential_error_names_the_provider() {
        let err = ApiError::CredentialMissing { provider: "OpenRouter" };
        assert_eq!(err.to_string(), "OpenRouter API key not set");
    }
}
