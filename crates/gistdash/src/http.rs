//! Shared JSON fetch layer.
//!
//! Every external source (market data, weather, EDGAR, Polymarket) speaks
//! JSON over plain GET. This wrapper applies the default User-Agent and
//! timeout, and turns non-2xx responses into errors carrying the body
//! text.

use std::time::Duration;

use serde::de::DeserializeOwned;

/// Default User-Agent; some sources (Yahoo) reject requests without one.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from the fetch layer.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, HttpError>;

/// JSON GET client with shared defaults.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// GET a URL and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_with(url, &[], &[]).await
    }

    /// GET with extra headers and query parameters.
    ///
    /// Headers override the client defaults (EDGAR requires a contact
    /// User-Agent); query values are percent-encoded by reqwest.
    pub async fn get_json_with<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut req = self.client.get(url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        if !query.is_empty() {
            req = req.query(query);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
