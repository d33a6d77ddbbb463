//! DashScope `ChatProvider` implementation.

use async_trait::async_trait;
use tracing::debug;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::{LlmError, Result};

use super::client::DashScope;
use super::types::CompletionResponse;

impl DashScope {
    /// Convert the wire response, keeping only the first choice.
    pub(crate) fn parse_response(response: CompletionResponse) -> Result<ChatResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::response_format("at least one choice", "empty choices"))?;

        Ok(ChatResponse {
            content: choice.message.content,
            finish_reason: choice.finish_reason,
            model: response.model,
            id: response.id,
        })
    }
}

#[async_trait]
impl ChatProvider for DashScope {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.chat_url();
        let body = self.build_body(request);
        debug!(
            url = %url,
            model = body.model,
            messages = body.messages.len(),
            response_format = body.response_format.map(|f| f.as_str()),
            "sending chat completion"
        );

        let response = self
            .build_request(&url)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let response_text = response.text().await.map_err(LlmError::from)?;
        let parsed: CompletionResponse = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::response_format(
                "valid chat completion response",
                format!("parse error: {e}, response: {response_text}"),
            )
        })?;

        let parsed = Self::parse_response(parsed)?;
        debug!(
            id = parsed.id.as_deref(),
            finish_reason = parsed.finish_reason.as_deref(),
            "received chat completion"
        );
        Ok(parsed)
    }

    fn provider_name(&self) -> &'static str {
        Self::PROVIDER
    }

    fn default_model(&self) -> &str {
        self.model()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn parse(json: &str) -> Result<ChatResponse> {
        DashScope::parse_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn first_choice_wins() {
        let response = parse(
            r#"{"id":"c1","model":"qwen-vl-max","choices":[
                {"message":{"content":"first"},"finish_reason":"stop"},
                {"message":{"content":"second"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("first"));
        assert_eq!(response.id.as_deref(), Some("c1"));
    }

    #[test]
    fn empty_choices_is_format_error() {
        let err = parse(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::ResponseFormat { .. })));
    }

    #[test]
    fn null_content_is_kept_as_none() {
        let response = parse(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(response.text(), None);
    }
}
