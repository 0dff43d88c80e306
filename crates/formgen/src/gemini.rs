//! Google Gemini `generateContent` client.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::ModelConfig;
use crate::error::{ConfigError, UpstreamError};
use crate::model::{FormModel, ModelFuture};

/// Maximum number of characters of an error body kept in an [`UpstreamError`].
const MAX_ERROR_BODY_CHARS: usize = 500;

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Set on thinking-model reasoning parts; those are not reply text.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, excluding thought parts.
    fn text(&self) -> Option<String> {
        let content = self.candidates.as_ref()?.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Why no text came back, if the API said.
    fn empty_reason(&self) -> Option<String> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| {
                self.candidates
                    .as_ref()
                    .and_then(|c| c.first())
                    .and_then(|c| c.finish_reason.clone())
            })
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    config: ModelConfig,
    url: String,
}

impl GeminiClient {
    /// Build the client. The HTTP connection pool is shared by every call.
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("formgen/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ConfigError::Client {
                message: e.to_string(),
            })?;
        let url = config.generate_content_url();
        Ok(Self {
            client,
            config,
            url,
        })
    }

    /// Send `prompt` as a single user turn and return the reply text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, UpstreamError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                    thought: false,
                }],
                role: Some("user".to_string()),
            }],
            generation_config: self.config.json_mode.then(|| GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
            }),
        };

        debug!(
            "Gemini request: model={}, prompt={} chars, json_mode={}",
            self.config.model,
            prompt.len(),
            self.config.json_mode,
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;

        debug!(
            "Gemini response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(classify_http_error(status, &text));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| UpstreamError::Decode {
                message: e.to_string(),
            })?;

        if let Some(ref usage) = parsed.usage_metadata {
            debug!(
                "Token usage: prompt={}, candidates={}, total={}",
                usage.prompt_token_count.unwrap_or(0),
                usage.candidates_token_count.unwrap_or(0),
                usage.total_token_count.unwrap_or(0),
            );
        }

        match parsed.text() {
            Some(reply) => {
                trace!("Gemini reply: {reply}");
                Ok(reply)
            }
            None => Err(UpstreamError::EmptyReply {
                reason: parsed.empty_reason(),
            }),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout {
                timeout_seconds: self.config.timeout_seconds,
            }
        } else {
            UpstreamError::Network {
                message: e.to_string(),
            }
        }
    }
}

impl FormModel for GeminiClient {
    fn invoke(&self, prompt: &str) -> ModelFuture<'_> {
        let prompt = prompt.to_string();
        Box::pin(async move { self.generate_text(&prompt).await })
    }
}

/// Map a non-success response onto an [`UpstreamError`].
fn classify_http_error(status: reqwest::StatusCode, body: &str) -> UpstreamError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|r| r.error);

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return UpstreamError::RateLimited {
            message: detail
                .map(|d| d.message)
                .unwrap_or_else(|| truncate(body)),
        };
    }

    match detail {
        Some(d) => UpstreamError::Api {
            status: if d.status.is_empty() {
                status.as_u16().to_string()
            } else {
                d.status
            },
            message: d.message,
        },
        None => UpstreamError::Http {
            status: status.as_u16(),
            message: truncate(body),
        },
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
