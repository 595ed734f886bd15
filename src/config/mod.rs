//! Configuration management for PromptDirector
//!
//! Supports configuration via:
//! 1. Config file (~/.config/prompt-director/config.toml)
//! 2. Environment variables (OPENROUTER_API_KEY, ANTHROPIC_API_KEY, etc.)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::api::{AnthropicConfig, OpenRouterConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Primary tier (Cerebras via OpenRouter)
    pub openrouter: OpenRouterSettings,

    /// Fallback tier (Claude via Anthropic)
    pub anthropic: AnthropicSettings,

    /// Session store eviction knobs
    pub store: StoreSettings,
}

/// OpenRouter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterSettings {
    /// API key (can also use OPENROUTER_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for the OpenRouter API
    pub base_url: String,

    /// Model to route
    pub model: String,

    /// Maximum tokens for completions
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenRouterSettings {
    fn default() -> Self {
        let defaults = OpenRouterConfig::default();
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: defaults.model,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            timeout_secs: defaults.timeout_secs,
        }
    }
}

/// Anthropic settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicSettings {
    /// API key (can also use ANTHROPIC_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for the Anthropic API
    pub base_url: String,

    /// Model to use
    pub model: String,

    /// Maximum tokens for completions
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        let defaults = AnthropicConfig::default();
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: defaults.model,
            max_tokens: defaults.max_tokens,
            timeout_secs: defaults.timeout_secs,
        }
    }
}

/// Session store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Maximum live sessions before LRU eviction
    pub capacity: usize,

    /// Idle seconds before a session is reclaimed
    pub idle_ttl_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            capacity: 256,
            idle_ttl_secs: 3600,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prompt-director")
            .join("config.toml")
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())
    }

    /// Load config from specific path
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default().with_env_overrides());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config.with_env_overrides())
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            self.openrouter.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENROUTER_BASE_URL") {
            self.openrouter.base_url = url;
        }
        if let Ok(model) = std::env::var("OPENROUTER_MODEL") {
            self.openrouter.model = model;
        }

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            self.anthropic.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("ANTHROPIC_BASE_URL") {
            self.anthropic.base_url = url;
        }
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            self.anthropic.model = model;
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let openrouter_configured = self
            .openrouter
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty());
        let anthropic_configured = self
            .anthropic
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty());

        if !openrouter_configured && !anthropic_configured {
            return Err(ConfigError::MissingRequired(
                "At least one provider must be configured (OPENROUTER_API_KEY or ANTHROPIC_API_KEY)"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Client configuration for the primary tier
    pub fn openrouter_provider_config(&self) -> OpenRouterConfig {
        OpenRouterConfig {
            api_key: self.openrouter.api_key.clone().unwrap_or_default(),
            model: self.openrouter.model.clone(),
            base_url: Some(self.openrouter.base_url.clone()),
            max_tokens: self.openrouter.max_tokens,
            temperature: self.openrouter.temperature,
            timeout_secs: self.openrouter.timeout_secs,
        }
    }

    /// Client configuration for the fallback tier
    pub fn anthropic_provider_config(&self) -> AnthropicConfig {
        AnthropicConfig {
            api_key: self.anthropic.api_key.clone().unwrap_or_default(),
            model: self.anthropic.model.clone(),
            base_url: Some(self.anthropic.base_url.clone()),
            max_tokens: self.anthropic.max_tokens,
            timeout_secs: self.anthropic.timeout_secs,
        }
    }

    /// Generate example config content
    pub fn example() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

/// Builder for creating Config programmatically
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn openrouter_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.openrouter.api_key = Some(key.into());
        self
    }

    pub fn openrouter_model(mut self, model: impl Into<String>) -> Self {
        self.config.openrouter.model = model.into();
        self
    }

    pub fn anthropic_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.anthropic.api_key = Some(key.into());
        self
    }

    pub fn anthropic_model(mut self, model: impl Into<String>) -> Self {
        self.config.anthropic.model = model.into();
        self
    }

    pub fn store_capacity(mut self, capacity: usize) -> Self {
        self.config.store.capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
