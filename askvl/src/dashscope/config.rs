//! DashScope client configuration.

use std::fmt;

use crate::error::{LlmError, Result};

/// Configuration for the DashScope OpenAI-compatible client.
#[derive(Clone, PartialEq, Eq)]
pub struct DashScopeConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,
    /// Default model.
    pub model: String,
    /// Request timeout in seconds. `None` leaves the transport default.
    pub timeout_secs: Option<u64>,
}

impl DashScopeConfig {
    /// Default OpenAI-compatible base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "qwen-vl-max";

    /// Environment variable holding the API key.
    pub const API_KEY_ENV: &'static str = "DASHSCOPE_API_KEY";
    /// Environment variable overriding the base URL.
    pub const BASE_URL_ENV: &'static str = "DASHSCOPE_BASE_URL";
    /// Environment variable overriding the model.
    pub const MODEL_ENV: &'static str = "DASHSCOPE_MODEL";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `DASHSCOPE_API_KEY` - Required API key
    /// - `DASHSCOPE_BASE_URL` - Optional base URL
    /// - `DASHSCOPE_MODEL` - Optional default model
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Auth`] if `DASHSCOPE_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from a variable lookup, with the same rules as
    /// [`from_env`](Self::from_env).
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(Self::API_KEY_ENV).ok_or_else(|| {
            LlmError::auth(
                "dashscope",
                format!("{} environment variable not set", Self::API_KEY_ENV),
            )
        })?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup(Self::BASE_URL_ENV) {
            config = config.with_base_url(url);
        }
        if let Some(model) = lookup(Self::MODEL_ENV) {
            config = config.with_model(model);
        }
        Ok(config)
    }

    /// Sets the base URL. A trailing slash is dropped.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_owned();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

impl Default for DashScopeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            timeout_secs: None,
        }
    }
}

impl fmt::Debug for DashScopeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashScopeConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
