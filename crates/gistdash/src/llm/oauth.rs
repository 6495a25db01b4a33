//! OAuth token refresh for Claude subscription accounts.
//!
//! The agent job authenticates with a long-lived refresh token and
//! exchanges it for a short-lived access token on every run. Refresh
//! failure is the job's one fatal condition.

use serde::Deserialize;
use serde_json::json;

const TOKEN_URL: &str = "https://console.anthropic.com/v1/oauth/token";
const CLIENT_ID: &str = "9d1c250a-e61b-44d9-88ed-5944d1962f5e";
const USER_AGENT: &str = "claude-code/1.0";

/// Errors from the token exchange.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token refresh failed (status {status}): {body}")]
    Refresh { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, OAuthError>;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange a refresh token for a fresh access token.
pub async fn refresh_access_token(refresh_token: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let payload = json!({
        "grant_type": "refresh_token",
        "refresh_token": refresh_token,
        "client_id": CLIENT_ID,
    });

    let response = client
        .post(TOKEN_URL)
        .header("Content-Type", "application/json")
        .header("User-Agent", USER_AGENT)
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(OAuthError::Refresh {
            status: status.as_u16(),
            body,
        });
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_response() {
        let raw = r#"{"access_token": "sk-ant-oat-abc", "expires_in": 3600}"#;
        let token: TokenResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(token.access_token, "sk-ant-oat-abc");
    }
}
