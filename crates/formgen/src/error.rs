//! Error types for model invocation and configuration.
//!
//! Normalization never fails, so nothing here describes a bad model reply.
//! [`UpstreamError`] covers everything that can go wrong reaching the model;
//! [`ConfigError`] covers startup configuration.

use thiserror::Error;

/// Failure while invoking the generative model.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The request never produced an HTTP response (DNS, connect, TLS, reset).
    #[error("request failed: {message}")]
    Network { message: String },

    /// The HTTP client gave up waiting for a response.
    #[error("request timed out after {timeout_seconds}s")]
    Timeout { timeout_seconds: u64 },

    /// Quota or rate limit exhausted (HTTP 429).
    #[error("rate limited by model API: {message}")]
    RateLimited { message: String },

    /// The API returned a structured error body.
    #[error("model API error ({status}): {message}")]
    Api { status: String, message: String },

    /// Non-success status without a recognizable error body.
    #[error("model API HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The success body could not be decoded as a `generateContent` response.
    #[error("failed to decode model response: {message}")]
    Decode { message: String },

    /// The model returned no text (no candidates, or blocked by safety filters).
    #[error("model returned no text{}", finish_reason_suffix(.reason))]
    EmptyReply { reason: Option<String> },
}

impl UpstreamError {
    /// Short machine-readable tag, used in HTTP error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Network { .. } => "network",
            UpstreamError::Timeout { .. } => "timeout",
            UpstreamError::RateLimited { .. } => "rate_limited",
            UpstreamError::Api { .. } => "api",
            UpstreamError::Http { .. } => "http",
            UpstreamError::Decode { .. } => "decode",
            UpstreamError::EmptyReply { .. } => "empty_reply",
        }
    }
}

fn finish_reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(" (finish reason: {r})"),
        None => String::new(),
    }
}

/// Invalid or missing startup configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} is not set; put your Gemini API key in the environment or a .env file")]
    MissingApiKey { var: &'static str },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("{var}={value:?} is not a valid number of seconds")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("failed to build HTTP client: {message}")]
    Client { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reply_message_includes_reason() {
        let err = UpstreamError::EmptyReply {
            reason: Some("SAFETY".into()),
        };
        assert_eq!(err.to_string(), "model returned no text (finish reason: SAFETY)");

        let err = UpstreamError::EmptyReply { reason: None };
        assert_eq!(err.to_string(), "model returned no text");
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(UpstreamError::Timeout { timeout_seconds: 5 }.kind(), "timeout");
        assert_eq!(
            UpstreamError::Http {
                status: 500,
                message: String::new()
            }
            .kind(),
            "http"
        );
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = ConfigError::MissingApiKey {
            var: "GEMINI_API_KEY",
        };
        assert!(err.to_string().starts_with("GEMINI_API_KEY is not set"));
    }
}
