//! Minimal reqwest client for the Anthropic Messages API.
//!
//! Text-only messages, no streaming, no tools — the jobs only ever want a
//! single completion (plus the multi-turn error-feedback exchange in the
//! refinement loop). Supports both API-key auth and OAuth bearer tokens.

use serde::{Deserialize, Serialize};

// ── Constants ───────────────────────────────────────────────────────

/// Anthropic Messages API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Beta header required for OAuth bearer auth.
const OAUTH_BETA: &str = "oauth-2025-04-20";

// ── Errors ──────────────────────────────────────────────────────────

/// Errors from Claude API operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("ANTHROPIC_API_KEY not set")]
    MissingApiKey,
}

pub type Result<T> = std::result::Result<T, LlmError>;

// ── Auth and messages ───────────────────────────────────────────────

/// How requests are authorized.
#[derive(Debug, Clone)]
pub enum Auth {
    /// `x-api-key` header from a console API key.
    ApiKey(String),
    /// OAuth access token (Claude subscription accounts).
    Bearer(String),
}

/// A conversation message with plain-text content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: text.into(),
        }
    }
}

// ── API request/response ────────────────────────────────────────────

/// Wire format for the Messages API request.
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
}

/// A response content block; only text blocks are expected.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Wire format for the Messages API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
}

impl ApiResponse {
    /// Concatenate all text blocks into a single string.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ResponseBlock::Text { text } => Some(text.as_str()),
                ResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// A minimal Claude API client.
#[derive(Debug)]
pub struct ClaudeClient {
    client: reqwest::Client,
    auth: Auth,
    model: String,
}

impl ClaudeClient {
    pub fn new(auth: Auth, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
            model: model.to_string(),
        }
    }

    /// Create an API-key client from `ANTHROPIC_API_KEY`.
    pub fn from_env(model: &str) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| LlmError::MissingApiKey)?;
        Ok(Self::new(Auth::ApiKey(api_key), model))
    }

    /// Send a conversation and return the concatenated text reply.
    pub async fn send(
        &self,
        system: Option<&str>,
        messages: &[Message],
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<String> {
        let body = ApiRequest {
            model: &self.model,
            max_tokens,
            temperature,
            system,
            messages,
        };

        let mut req = self
            .client
            .post(API_URL)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json");
        req = match &self.auth {
            Auth::ApiKey(key) => req.header("x-api-key", key),
            Auth::Bearer(token) => req
                .header("Authorization", format!("Bearer {token}"))
                .header("anthropic-beta", OAUTH_BETA),
        };

        let response = req.json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ApiResponse = response.json().await?;
        Ok(api_response.text())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
