//! GitHub Gist read/write over the REST API.
//!
//! The dashboards live in gist files; the agent's memory blob lives in a
//! second, data-only gist. Reads are a single GET; writes PATCH the file
//! content and are retried a fixed number of times with a fixed backoff.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

/// Filename used for pinned dashboard gists: the Braille blank character,
/// so the gist preview shows no visible filename above the content.
pub const DASHBOARD_FILENAME: &str = "\u{2800}";

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "gistdash";
const TIMEOUT: Duration = Duration::from_secs(15);

const PATCH_ATTEMPTS: u32 = 3;
const PATCH_BACKOFF: Duration = Duration::from_secs(2);

/// Errors from gist operations.
#[derive(Debug, thiserror::Error)]
pub enum GistError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GH_TOKEN not set")]
    MissingToken,

    #[error("gist has no file named {name:?}")]
    MissingFile { name: String },
}

pub type Result<T> = std::result::Result<T, GistError>;

#[derive(Debug, Deserialize)]
struct GistResponse {
    files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    content: Option<String>,
}

/// Minimal gist client authorized via `GH_TOKEN`.
#[derive(Debug)]
pub struct GistClient {
    client: reqwest::Client,
    token: String,
}

impl GistClient {
    /// Create a client from the `GH_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GH_TOKEN").map_err(|_| GistError::MissingToken)?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;
        Ok(Self { client, token })
    }

    /// Read one file's content from a gist.
    pub async fn read_file(&self, gist_id: &str, filename: &str) -> Result<String> {
        let url = format!("{API_BASE}/gists/{gist_id}");
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GistError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let gist: GistResponse = response.json().await?;
        gist.files
            .get(filename)
            .and_then(|f| f.content.clone())
            .ok_or_else(|| GistError::MissingFile {
                name: filename.to_string(),
            })
    }

    /// Replace one file's content in a gist.
    ///
    /// Retries up to 3 attempts with a 2 s pause between them; returns the
    /// last error if every attempt fails.
    pub async fn write_file(&self, gist_id: &str, filename: &str, content: &str) -> Result<()> {
        let url = format!("{API_BASE}/gists/{gist_id}");
        let payload = json!({
            "files": { filename: { "content": content } }
        });

        let mut attempt = 1;
        loop {
            match self.patch_once(&url, &payload).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < PATCH_ATTEMPTS => {
                    log::warn!("gist PATCH attempt {attempt} failed: {e}");
                    attempt += 1;
                    tokio::time::sleep(PATCH_BACKOFF).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn patch_once(&self, url: &str, payload: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .patch(url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GistError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_filename_is_braille_blank() {
        assert_eq!(DASHBOARD_FILENAME, "\u{2800}");
        assert_eq!(DASHBOARD_FILENAME.chars().count(), 1);
    }

    #[test]
    fn parses_gist_response() {
        let raw = r#"{
            "files": {
                "agent_memory.json": {"content": "{\"update_count\": 3}"},
                "notes.md": {"content": null}
            }
        }"#;
        let gist: GistResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            gist.files["agent_memory.json"].content.as_deref(),
            Some("{\"update_count\": 3}")
        );
        assert!(gist.files["notes.md"].content.is_none());
    }
}
