//! Chat message model and the messages-file loader.
//!
//! A loaded messages file is kept as the raw JSON value it contains and sent
//! exactly as read. The only local check is that the file is valid JSON; the
//! remote service is the only validator of its shape. [`Message`] and
//! [`ContentPart`] are builders that produce the same raw form.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};

/// The message list sent with a request.
///
/// Normally a JSON array of message objects, but any JSON value loaded from
/// a file is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages(Value);

impl Messages {
    /// An empty message array.
    #[must_use]
    pub const fn new() -> Self {
        Self(Value::Array(Vec::new()))
    }

    /// Number of messages. A non-array value counts as one.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.0 {
            Value::Array(items) => items.len(),
            _ => 1,
        }
    }

    /// Whether the list is an empty array.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a message. A non-array value becomes the first element of a
    /// new array.
    pub fn push(&mut self, message: Message) {
        if let Value::Array(items) = &mut self.0 {
            items.push(message.0);
        } else {
            let first = self.0.take();
            self.0 = Value::Array(vec![first, message.0]);
        }
    }

    /// Number of non-text content parts across all messages.
    #[must_use]
    pub fn media_parts(&self) -> usize {
        match &self.0 {
            Value::Array(items) => items.iter().map(media_parts_of).sum(),
            other => media_parts_of(other),
        }
    }

    /// The raw JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume into the raw JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for Messages {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Vec<Message>> for Messages {
    fn from(messages: Vec<Message>) -> Self {
        Self(Value::Array(messages.into_iter().map(|m| m.0).collect()))
    }
}

/// A single conversation turn, built locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    /// Create a message with a role and plain-text content.
    #[must_use]
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self(json!({ "role": role.into(), "content": text.into() }))
    }

    /// Create a system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new("system", text)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new("user", text)
    }

    /// Create a user message from content parts.
    #[must_use]
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        let parts: Vec<Value> = parts.into_iter().map(|p| p.0).collect();
        Self(json!({ "role": "user", "content": parts }))
    }

    /// The role string, if present.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.0.get("role").and_then(Value::as_str)
    }

    /// Number of non-text content parts.
    #[must_use]
    pub fn media_parts(&self) -> usize {
        media_parts_of(&self.0)
    }
}

/// One part of a multimodal message, built locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentPart(Value);

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self(json!({ "type": "text", "text": text.into() }))
    }

    /// Create an image part from a URL or data URL.
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self(json!({ "type": "image_url", "image_url": { "url": url.into() } }))
    }

    /// Create a video part from a list of frame URLs.
    #[must_use]
    pub fn video_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let frames: Vec<String> = frames.into_iter().map(Into::into).collect();
        Self(json!({ "type": "video", "video": frames }))
    }

    /// Whether this is a text part.
    #[must_use]
    pub fn is_text(&self) -> bool {
        is_text_part(&self.0)
    }
}

/// A part is text if tagged `text`, or untagged with only a `text` field
/// (DashScope's native part form).
fn is_text_part(part: &Value) -> bool {
    match part.get("type").and_then(Value::as_str) {
        Some(kind) => kind == "text",
        None => part.as_object().is_some_and(|o| o.len() == 1 && o.contains_key("text")),
    }
}

fn media_parts_of(message: &Value) -> usize {
    match message.get("content") {
        Some(Value::Array(parts)) => parts.iter().filter(|p| !is_text_part(p)).count(),
        _ => 0,
    }
}

/// Load a message list from a JSON file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Json`] if
/// it is not valid JSON.
pub async fn load_messages(path: impl AsRef<Path>) -> Result<Messages> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    let messages = parse_messages(&bytes).map_err(|e| Error::json(path, e))?;
    debug!(path = %path.display(), count = messages.len(), "loaded messages");
    Ok(messages)
}

/// Parse a message list from raw JSON bytes.
///
/// # Errors
///
/// Returns the underlying parse error if `bytes` is not valid JSON.
pub fn parse_messages(bytes: &[u8]) -> serde_json::Result<Messages> {
    serde_json::from_slice(bytes)
}
