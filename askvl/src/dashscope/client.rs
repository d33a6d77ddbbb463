//! DashScope API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::chat::ChatRequest;
use crate::error::{LlmError, Result};

use super::config::DashScopeConfig;
use super::types::{CompletionRequest, ErrorResponse};

/// Client for DashScope's OpenAI-compatible mode.
#[derive(Debug, Clone)]
pub struct DashScope {
    pub(crate) config: Arc<DashScopeConfig>,
    pub(crate) client: Client,
}

impl DashScope {
    /// Provider name used in errors and logs.
    pub const PROVIDER: &'static str = "dashscope";

    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Auth`] if the API key is empty and
    /// [`LlmError::Internal`] if the HTTP client cannot be built.
    pub fn new(config: DashScopeConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth(
                Self::PROVIDER,
                format!("API key is required; set {}", DashScopeConfig::API_KEY_ENV),
            )
            .into());
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// See [`DashScopeConfig::from_env`] and [`DashScope::new`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::new(DashScopeConfig::from_lookup(lookup)?)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the chat completions URL.
    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Build a JSON POST request with auth headers.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
    }

    /// Build the request body. An empty request model falls back to the
    /// configured one.
    pub(crate) fn build_body<'a>(&'a self, request: &'a ChatRequest) -> CompletionRequest<'a> {
        let model = if request.model.is_empty() {
            self.config.model.as_str()
        } else {
            request.model.as_str()
        };

        CompletionRequest {
            model,
            messages: &request.messages,
            response_format: request.response_format.as_ref(),
            stream: false,
        }
    }

    /// Map a non-success response to an error.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(body) {
            let error = error_response.error;
            let code = error.code.or(error.error_type);

            return match status {
                401 | 403 => LlmError::auth(Self::PROVIDER, error.message),
                429 => LlmError::rate_limited(Self::PROVIDER),
                _ => LlmError::provider(Self::PROVIDER, error.message, code),
            };
        }

        LlmError::http_status(status, body.to_owned())
    }
}
