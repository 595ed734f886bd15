//! PromptDirector - Image-synthesis prompts from live speech transcripts
//!
//! This library turns a rolling speech transcript into Stable Diffusion
//! prompts, adapting each generation to the session's recent output, the
//! user's style tags, and operator "VJ" steering instructions.
//!
//! ## Key Features
//!
//! - **Session Context**: Fixed 5-slot rolling window of recent prompts per session
//! - **Prompt Compilation**: System/user message assembly with style, continuity, and VJ blocks
//! - **Tiered Providers**: Cerebras (via OpenRouter) primary with Claude fallback
//! - **Bounded Retries**: Three immediate primary attempts, one fallback attempt
//! - **Error Sanitization**: API keys and bearer tokens never leave the boundary

pub mod api;
pub mod config;
pub mod extract;
pub mod handler;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use api::{ApiError, ChatRequest, ProviderClient, ProviderTier};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use extract::{extract_prompt, sanitize_error};
pub use handler::{handle, InvokeRequest, InvokeResponse};
pub use orchestrator::{
    GenerateError, GenerationRequest, GenerationResult, Orchestrator, PromptDirector,
};
pub use prompt::{build_system_prompt, build_user_message, VjInstruction};
pub use session::{Session, SessionStore, SessionStoreConfig, DEFAULT_SESSION_ID};
