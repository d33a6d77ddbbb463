//! The request runner: load messages, ask once, return the reply text.
//!
//! No retries, and the reply text is not inspected. Every failure is
//! returned to the caller as-is.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::chat::{ChatProvider, ChatRequest, ResponseFormat};
use crate::error::{LlmError, Result};
use crate::message::load_messages;

/// Runs a single chat completion for a messages file.
#[derive(Debug, Clone)]
pub struct Runner<P> {
    provider: P,
    messages_path: PathBuf,
    model: String,
    response_format: ResponseFormat,
}

impl<P: ChatProvider> Runner<P> {
    /// Create a runner using the provider's default model and JSON-object
    /// output.
    #[must_use]
    pub fn new(provider: P, messages_path: impl Into<PathBuf>) -> Self {
        let model = provider.default_model().to_owned();
        Self {
            provider,
            messages_path: messages_path.into(),
            model,
            response_format: ResponseFormat::json(),
        }
    }

    /// Override the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the response format.
    #[must_use]
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Path of the messages file.
    #[must_use]
    pub fn messages_path(&self) -> &Path {
        &self.messages_path
    }

    /// Model identifier sent with the request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Build the request for the messages file without sending it.
    ///
    /// # Errors
    ///
    /// Fails if the messages file is missing or is not valid JSON.
    pub async fn prepare(&self) -> Result<ChatRequest> {
        let messages = load_messages(&self.messages_path).await?;
        Ok(ChatRequest::with_messages(self.model.clone(), messages)
            .response_format(self.response_format.clone()))
    }

    /// Load the messages, send one request and return the first choice's
    /// content.
    ///
    /// # Errors
    ///
    /// Fails if the messages file is missing or invalid, if the request
    /// fails, or if the reply carries no content.
    pub async fn run(&self) -> Result<String> {
        let request = self.prepare().await?;
        debug!(
            provider = self.provider.provider_name(),
            model = %request.model,
            messages = request.messages.len(),
            media = request.messages.media_parts(),
            "running request"
        );

        let response = self.provider.chat(&request).await?;
        response
            .content
            .ok_or_else(|| LlmError::response_format("message content", "null").into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_fs::prelude::*;
    use async_trait::async_trait;

    use super::*;
    use crate::chat::ChatResponse;
    use crate::error::Error;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: AtomicUsize,
        last: Mutex<Option<ChatRequest>>,
        reply: Option<String>,
    }

    impl Recorder {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_owned()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl ChatProvider for Recorder {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            Ok(ChatResponse {
                content: self.reply.clone(),
                ..Default::default()
            })
        }

        fn provider_name(&self) -> &'static str {
            "recorder"
        }

        fn default_model(&self) -> &str {
            "qwen-vl-max"
        }
    }

    #[tokio::test]
    async fn returns_content_and_sends_json_object() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("messages.json");
        file.write_str(r#"[{"role":"user","content":"hi"}]"#).unwrap();

        let runner = Runner::new(Recorder::replying(r#"{"events":[]}"#), file.path());
        assert_eq!(runner.run().await.unwrap(), r#"{"events":[]}"#);

        let recorder = runner.provider();
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
        let sent = recorder.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.model, "qwen-vl-max");
        assert_eq!(sent.response_format, Some(ResponseFormat::JsonObject));
        assert_eq!(sent.messages.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_makes_no_call() {
        let dir = assert_fs::TempDir::new().unwrap();
        let runner = Runner::new(Recorder::replying("x"), dir.child("messages.json").path());

        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(runner.provider().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_json_makes_no_call() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("messages.json");
        file.write_str(r#"[{"role":"user","content":"hi"},]"#).unwrap();

        let runner = Runner::new(Recorder::replying("x"), file.path());
        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert_eq!(runner.provider().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn null_content_is_an_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("messages.json");
        file.write_str("[]").unwrap();

        let runner = Runner::new(Recorder::default(), file.path());
        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::ResponseFormat { .. })));
    }

    #[tokio::test]
    async fn overrides_reach_the_request() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("messages.json");
        file.write_str("[]").unwrap();

        let runner = Runner::new(Recorder::replying("ok"), file.path())
            .with_model("qwen-vl-plus")
            .with_response_format(crate::schema::event_report_format());
        let request = runner.prepare().await.unwrap();
        assert_eq!(request.model, "qwen-vl-plus");
        assert_eq!(
            request.response_format.as_ref().map(ResponseFormat::as_str),
            Some("json_schema")
        );
    }
}
