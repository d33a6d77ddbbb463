//! DashScope client (OpenAI-compatible mode).
//!
//! Talks to `{base_url}/chat/completions` with bearer auth. Only
//! non-streaming chat completions are supported.

mod chat;
mod client;
mod config;
mod types;

pub use client::DashScope;
pub use config::DashScopeConfig;
