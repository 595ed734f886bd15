//! Generation orchestration: bounded retries and tier fallback
//!
//! This module coordinates one logical generation end to end:
//! - Up to three immediate, sequential attempts against the primary tier
//! - Exactly one attempt against the fallback tier if all of those fail
//! - Extraction of the final prompt from raw model output
//! - Session rotation after a successful generation

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, ChatRequest, ProviderClient, ProviderTier};
use crate::config::Config;
use crate::extract::extract_prompt;
use crate::prompt::{build_system_prompt, build_user_message, VjInstruction};
use crate::session::{SessionStore, SessionStoreConfig};

/// Retries after the initial primary attempt (three attempts total).
pub const PRIMARY_MAX_RETRIES: u32 = 2;

/// One generation request, as decoded from the invocation envelope.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub session_id: String,
    pub transcript: String,
    pub style_tags: String,
    pub vj_instruction: Option<String>,
}

/// Outcome of a successful generation.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub prompt: String,
    pub provider_used: ProviderTier,
    pub latency_ms: u64,
}

/// Terminal generation failure.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Missing request body")]
    MissingBody,

    #[error("All LLM providers failed: {0}")]
    AllProvidersFailed(ApiError),
}

/// Drives the two provider tiers in strict priority order.
pub struct Orchestrator {
    primary: Arc<dyn ProviderClient>,
    secondary: Arc<dyn ProviderClient>,
    max_retries: u32,
}

impl Orchestrator {
    pub fn new(primary: Arc<dyn ProviderClient>, secondary: Arc<dyn ProviderClient>) -> Self {
        Self {
            primary,
            secondary,
            max_retries: PRIMARY_MAX_RETRIES,
        }
    }

    /// Run one compiled request through the tiers, returning the extracted
    /// prompt and the tier that produced it.
    ///
    /// Attempts are sequential with no backoff. On total failure the most
    /// recent error is surfaced; the fallback always runs once the primary
    /// budget is exhausted, so that is its error.
    pub async fn call_with_fallback(
        &self,
        request: &ChatRequest,
    ) -> Result<(String, ProviderTier), ApiError> {
        for attempt in 1..=(self.max_retries + 1) {
            match self.attempt(self.primary.as_ref(), request).await {
                Ok(prompt) => return Ok((prompt, self.primary.tier())),
                Err(err) => {
                    warn!(
                        attempt,
                        tier = self.primary.tier().as_str(),
                        error = %err,
                        "primary attempt failed"
                    );
                }
            }
        }

        info!(tier = self.secondary.tier().as_str(), "falling back to secondary tier");
        match self.attempt(self.secondary.as_ref(), request).await {
            Ok(prompt) => Ok((prompt, self.secondary.tier())),
            Err(err) => {
                warn!(
                    tier = self.secondary.tier().as_str(),
                    error = %err,
                    "fallback attempt failed"
                );
                Err(err)
            }
        }
    }

    async fn attempt(
        &self,
        provider: &dyn ProviderClient,
        request: &ChatRequest,
    ) -> Result<String, ApiError> {
        let raw = provider.generate(request).await?;
        extract_prompt(&raw).ok_or_else(|| ApiError::Format("empty completion".to_string()))
    }
}

/// Top-level generation service: session store plus call orchestration.
pub struct PromptDirector {
    store: SessionStore,
    orchestrator: Orchestrator,
}

impl PromptDirector {
    pub fn new(store: SessionStore, orchestrator: Orchestrator) -> Self {
        Self { store, orchestrator }
    }

    /// Wire the real provider tiers from configuration.
    pub fn from_config(config: &Config) -> Self {
        let store_config = SessionStoreConfig {
            capacity: config.store.capacity,
            idle_ttl: std::time::Duration::from_secs(config.store.idle_ttl_secs),
        };
        let primary = Arc::new(crate::api::OpenRouterProvider::new(
            config.openrouter_provider_config(),
        ));
        let secondary = Arc::new(crate::api::AnthropicProvider::new(
            config.anthropic_provider_config(),
        ));

        Self::new(
            SessionStore::new(store_config),
            Orchestrator::new(primary, secondary),
        )
    }

    /// Process one generation request end to end.
    ///
    /// The session lock is held across compile, provider calls, and rotation
    /// so concurrent requests for one session id serialize; distinct ids run
    /// in parallel. `latency_ms` covers the whole call pipeline including
    /// retries and fallback.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GenerateError> {
        let session = self.store.checkout(&request.session_id);
        let mut session = session.lock().await;

        let vj_instruction = request
            .vj_instruction
            .as_deref()
            .and_then(VjInstruction::parse);

        let chat = ChatRequest {
            system: build_system_prompt(&request.style_tags, &session, vj_instruction),
            user: build_user_message(&request.transcript, &session),
        };

        let start = Instant::now();
        let outcome = self.orchestrator.call_with_fallback(&chat).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (prompt, provider_used) = outcome.map_err(GenerateError::AllProvidersFailed)?;
        session.rotate(prompt.clone());

        Ok(GenerationResult {
            prompt,
            provider_used,
            latency_ms,
        })
    }
}
