//! Language-model access: Anthropic Messages client and OAuth refresh.

mod client;
mod oauth;

pub use client::{Auth, ClaudeClient, LlmError, Message, Result};
pub use oauth::{refresh_access_token, OAuthError};
