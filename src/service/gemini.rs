//! Google Gemini `generateContent` client.
//!
//! ```text
//! POST {base}/models/{model}:generateContent
//! x-goog-api-key: <key>
//!
//! { "contents": [{ "role": "user", "parts": [ {inlineData}, {text} ] }],
//!   "generationConfig": { "responseMimeType": "application/json",
//!                         "responseSchema": { ... } } }
//! ```
//!
//! The reply text is the concatenation of the first candidate's text parts.

use crate::config::QuizConfig;
use crate::error::{GenerationError, QuizError};
use crate::service::{ContentRequest, QuizService};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE_NAME: &str = "gemini";

/// Gemini REST client.
pub struct GeminiService {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiService {
    /// Build a client. `timeout` of None means no client-side limit.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, QuizError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| QuizError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from configuration.
    ///
    /// Fails with [`QuizError::MissingApiKey`] when no key is configured or
    /// present in the environment.
    pub fn from_config(config: &QuizConfig) -> Result<Self, QuizError> {
        let key = config.resolve_api_key()?;
        Self::new(
            key,
            config.api_base_url.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl QuizService for GeminiService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn generate_content(&self, request: &ContentRequest) -> Result<String, GenerationError> {
        let body = GenerateContentRequest::from(request);
        let url = self.endpoint(&request.model);
        debug!("POST {} ({} bytes inline)", url, request.file.data_base64.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport {
                service: SERVICE_NAME.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status.as_u16(), &text, retry_after));
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|e| GenerationError::Transport {
                service: SERVICE_NAME.to_string(),
                detail: format!("unreadable response body: {e}"),
            })?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini usage: {} prompt tokens, {} candidate tokens",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        extract_text(parsed)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Set on thought-summary parts, which are not part of the answer.
    #[serde(default, skip_serializing)]
    thought: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl From<&ContentRequest> for GenerateContentRequest {
    fn from(req: &ContentRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: req.file.mime_type.clone(),
                            data: req.file.data_base64.clone(),
                        }),
                        ..Default::default()
                    },
                    Part {
                        text: Some(req.instruction.clone()),
                        ..Default::default()
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: req.response_mime_type.clone(),
                response_schema: req.response_schema.clone(),
                temperature: req.temperature,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

// ── Response handling ────────────────────────────────────────────────────

/// Pull the answer text out of a successful response.
fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {r}"))
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(GenerationError::EmptyResponse { reason });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("finish reason {r}"))
            .unwrap_or_else(|| "empty text".to_string());
        return Err(GenerationError::EmptyResponse { reason });
    }

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            warn!("Gemini finished with reason {}; reply may be truncated", reason);
        }
    }

    Ok(text)
}

/// Map a non-success HTTP response to a [`GenerationError`].
fn map_http_error(status: u16, body: &str, retry_after_secs: Option<u64>) -> GenerationError {
    let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => (env.error.message, env.error.status),
        Err(_) => (body.trim().chars().take(300).collect(), String::new()),
    };

    let bad_key = status == 400 && api_status == "INVALID_ARGUMENT" && message.contains("API key");

    match status {
        401 | 403 => GenerationError::Auth {
            service: SERVICE_NAME.to_string(),
            detail: message,
        },
        _ if bad_key => GenerationError::Auth {
            service: SERVICE_NAME.to_string(),
            detail: message,
        },
        429 => GenerationError::RateLimited {
            service: SERVICE_NAME.to_string(),
            retry_after_secs,
        },
        _ => GenerationError::Api {
            service: SERVICE_NAME.to_string(),
            status,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::EncodedFile;
    use serde_json::json;

    fn request() -> ContentRequest {
        ContentRequest {
            model: "gemini-2.5-flash".into(),
            file: EncodedFile {
                name: "notes.pdf".into(),
                mime_type: "application/pdf".into(),
                data_base64: "JVBERi0=".into(),
            },
            instruction: "Create 3 multiple-choice questions".into(),
            response_schema: json!({"type": "OBJECT"}),
            response_mime_type: "application/json".into(),
            temperature: None,
        }
    }

    #[test]
    fn request_wire_format() {
        let body = serde_json::to_value(GenerateContentRequest::from(&request())).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[0]["inlineData"]["data"], "JVBERi0=");
        assert!(parts[0].get("text").is_none());
        assert_eq!(parts[1]["text"], "Create 3 multiple-choice questions");
        assert!(parts[1].get("thought").is_none());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn temperature_is_sent_when_set() {
        let mut req = request();
        req.temperature = Some(0.3);
        let body = serde_json::to_value(GenerateContentRequest::from(&req)).unwrap();
        let t = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((t - 0.3).abs() < 1e-6);
    }

    #[test]
    fn endpoint_format() {
        let svc = GeminiService::new("k", "https://example.test/v1beta/", None).unwrap();
        assert_eq!(
            svc.endpoint("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn extract_joins_text_parts_and_skips_thoughts() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "{\"mcqs\":" },
                    { "text": "[]}" }
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(resp).unwrap(), "{\"mcqs\":[]}");
    }

    #[test]
    fn extract_reports_blocked_prompt() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = extract_text(resp).unwrap_err();
        assert_eq!(
            err,
            GenerationError::EmptyResponse {
                reason: "prompt blocked: SAFETY".into()
            }
        );
    }

    #[test]
    fn extract_reports_empty_candidate() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();
        let err = extract_text(resp).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"), "got {err}");
    }

    #[test]
    fn maps_auth_errors() {
        let body = r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#;
        assert!(matches!(map_http_error(403, body, None), GenerationError::Auth { .. }));

        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(map_http_error(400, body, None), GenerationError::Auth { .. }));
    }

    #[test]
    fn maps_rate_limit_with_retry_after() {
        let err = map_http_error(429, "{}", Some(12));
        assert_eq!(
            err,
            GenerationError::RateLimited {
                service: "gemini".into(),
                retry_after_secs: Some(12)
            }
        );
    }

    #[test]
    fn maps_other_status_with_raw_body() {
        match map_http_error(500, "upstream exploded", None) {
            GenerationError::Api { status, message, .. } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
