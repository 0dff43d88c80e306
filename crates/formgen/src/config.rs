//! Model configuration, loaded once at startup.
//!
//! [`ModelConfig`] holds the Gemini credential and endpoint settings. It is
//! built before the server starts and never mutated afterwards; the client
//! takes it by value.

use std::fmt;

use crate::error::ConfigError;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Optional override for the model id.
pub const MODEL_VAR: &str = "GEMINI_MODEL";
/// Optional override for the API base URL.
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
/// Optional override for the request timeout, in seconds.
pub const TIMEOUT_VAR: &str = "GEMINI_TIMEOUT_SECONDS";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v1beta";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Settings for the Gemini `generateContent` call.
#[derive(Clone)]
pub struct ModelConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Model identifier. Default: `"gemini-2.5-flash"`.
    pub model: String,
    /// API origin, without a trailing slash. Default: Google's public endpoint.
    pub base_url: String,
    /// API version path segment. Default: `"v1beta"`.
    pub api_version: String,
    /// HTTP timeout for one model call. Default: `120`.
    pub timeout_seconds: u64,
    /// Ask the model for `application/json` output. Default: `false`.
    pub json_mode: bool,
}

impl ModelConfig {
    /// Create a config with default endpoint settings.
    ///
    /// Rejects a blank key so a misconfigured deployment fails at startup
    /// rather than on the first request.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::Empty { var: API_KEY_VAR });
        }
        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            json_mode: false,
        })
    }

    /// Read the config from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the config through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::MissingApiKey { var: API_KEY_VAR })?;
        let mut config = Self::new(api_key)?;

        if let Some(model) = lookup(MODEL_VAR).filter(|v| !v.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(base_url.trim());
        }
        if let Some(raw) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            config.timeout_seconds = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                var: TIMEOUT_VAR,
                value: raw.clone(),
            })?;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    /// Full `generateContent` URL for the configured model.
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, self.api_version, self.model
        )
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("json_mode", &self.json_mode)
            .finish()
    }
}
