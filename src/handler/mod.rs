//! Function-invocation envelope
//!
//! The hosting platform invokes the core with `{ "body": { ... } }` and
//! expects `{ "statusCode": n, "body": ... }` back. Status mapping:
//! 400 for a missing body, 500 when both provider tiers are exhausted,
//! 200 with the generated prompt otherwise. Every error string leaving this
//! module is sanitized first.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::extract::sanitize_error;
use crate::orchestrator::{GenerateError, GenerationRequest, PromptDirector};
use crate::session::DEFAULT_SESSION_ID;

/// Incoming invocation. The body stays a raw `Value` so an absent, null, or
/// empty-object body can all be told apart from a usable one.
#[derive(Debug, Clone, Deserialize)]
pub struct InvokeRequest {
    #[serde(default)]
    pub body: Value,
}

/// Outgoing invocation result.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

#[derive(Debug, Deserialize)]
struct RequestBody {
    #[serde(default = "default_session_id")]
    session_id: String,
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    style_tags: String,
    #[serde(default)]
    vj_instruction: Option<String>,
}

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

/// Process one invocation against the director.
pub async fn handle(director: &PromptDirector, request: InvokeRequest) -> InvokeResponse {
    let body = match decode_body(request.body) {
        Ok(body) => body,
        Err(err) => return error_response(err),
    };

    let result = director
        .generate(GenerationRequest {
            session_id: body.session_id,
            transcript: body.transcript,
            style_tags: body.style_tags,
            vj_instruction: body.vj_instruction,
        })
        .await;

    match result {
        Ok(result) => InvokeResponse {
            status_code: 200,
            body: json!({
                "prompt": result.prompt,
                "provider_used": result.provider_used.as_str(),
                "latency_ms": result.latency_ms,
            }),
        },
        Err(err) => error_response(err),
    }
}

fn decode_body(body: Value) -> Result<RequestBody, GenerateError> {
    match body {
        Value::Object(map) if !map.is_empty() => {
            serde_json::from_value(Value::Object(map)).map_err(|_| GenerateError::MissingBody)
        }
        _ => Err(GenerateError::MissingBody),
    }
}

fn error_response(err: GenerateError) -> InvokeResponse {
    let status_code = match err {
        GenerateError::MissingBody => 400,
        GenerateError::AllProvidersFailed(_) => 500,
    };

    InvokeResponse {
        status_code,
        body: json!({ "error": sanitize_error(&err.to_string()) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ChatRequest, ProviderClient, ProviderTier};
    use crate::orchestrator::Orchestrator;
    use crate::session::SessionStore;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Provider that always returns the same outcome.
    struct StaticProvider {
        tier: ProviderTier,
        outcome: Result<String, (u16, String)>,
    }

    #[async_trait]
    impl ProviderClient for StaticProvider {
        async fn generate(&self, _request: &ChatRequest) -> Result<String, ApiError> {
            match &self.outcome {
                Ok(text) => Ok(text.clone()),
                Err((status, detail)) => Err(ApiError::Http {
                    status: *status,
                    detail: detail.clone(),
                }),
            }
        }

        fn tier(&self) -> ProviderTier {
            self.tier
        }
    }

    fn director(
        primary: Result<String, (u16, String)>,
        secondary: Result<String, (u16, String)>,
    ) -> PromptDirector {
        PromptDirector::new(
            SessionStore::default(),
            Orchestrator::new(
                Arc::new(StaticProvider {
                    tier: ProviderTier::Cerebras,
                    outcome: primary,
                }),
                Arc::new(StaticProvider {
                    tier: ProviderTier::ClaudeFallback,
                    outcome: secondary,
                }),
            ),
        )
    }

    fn request(body: Value) -> InvokeRequest {
        InvokeRequest { body }
    }

    #[tokio::test]
    async fn missing_body_is_400() {
        let director = director(Ok("unused".to_string()), Ok("unused".to_string()));

        for body in [Value::Null, json!({})] {
            let response = handle(&director, request(body)).await;
            assert_eq!(response.status_code, 400);
            assert_eq!(response.body, json!({ "error": "Missing request body" }));
        }
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let director = director(Ok("unused".to_string()), Ok("unused".to_string()));
        let response = handle(&director, request(json!({ "transcript": 42 }))).await;
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn success_reports_provider_and_latency() {
        let director = director(Ok("a cat in rain".to_string()), Err((500, String::new())));
        let response = handle(
            &director,
            request(json!({ "transcript": "rain on a window" })),
        )
        .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["prompt"], "a cat in rain");
        assert_eq!(response.body["provider_used"], "cerebras");
        assert!(response.body["latency_ms"].is_u64());
    }

    #[tokio::test]
    async fn fallback_success_is_tagged_claude_fallback() {
        let director = director(
            Err((500, "internal".to_string())),
            Ok("rescued".to_string()),
        );
        let response = handle(&director, request(json!({ "transcript": "x" }))).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["provider_used"], "claude-fallback");
    }

    #[tokio::test]
    async fn total_failure_is_500_with_sanitized_error() {
        let director = director(
            Err((500, "boom".to_string())),
            Err((401, "invalid key sk-ant-abc123 (Bearer xyz789)".to_string())),
        );
        let response = handle(&director, request(json!({ "transcript": "x" }))).await;

        assert_eq!(response.status_code, 500);
        let error = response.body["error"].as_str().unwrap();
        assert!(error.starts_with("All LLM providers failed: "));
        assert!(error.contains("[REDACTED]"));
        assert!(!error.contains("sk-ant-abc123"));
        assert!(!error.contains("xyz789"));
    }

    #[tokio::test]
    async fn vj_instruction_is_optional_and_lenient() {
        let director = director(Ok("ok".to_string()), Err((500, String::new())));
        let response = handle(
            &director,
            request(json!({ "transcript": "x", "vj_instruction": "shuffle" })),
        )
        .await;
        assert_eq!(response.status_code, 200);
    }
}
