//! askvl - ask a DashScope vision model about a message list.
//!
//! Loads a JSON file of chat messages, sends it to an OpenAI-compatible
//! chat-completions endpoint (Alibaba DashScope by default) with a JSON
//! response format, and hands back the reply text unparsed.
//!
//! # Example
//!
//! ```rust,ignore
//! use askvl::{DashScope, Runner};
//!
//! let client = DashScope::from_env()?;
//! let reply = Runner::new(client, "messages.json").run().await?;
//! println!("{reply}");
//! ```

pub mod chat;
pub mod config;
pub mod dashscope;
pub mod error;
pub mod message;
pub mod runner;
pub mod schema;

pub use chat::{ChatProvider, ChatRequest, ChatResponse, JsonSchemaSpec, ResponseFormat};
pub use config::{FileConfig, Overrides, Settings};
pub use dashscope::{DashScope, DashScopeConfig};
pub use error::{ConfigError, Error, LlmError, Result};
pub use message::{ContentPart, Message, Messages, load_messages};
pub use runner::Runner;
