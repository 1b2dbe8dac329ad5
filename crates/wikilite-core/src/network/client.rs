//! HTTP client used to talk to the local engine.
//!
//! A thin wrapper around reqwest that fixes the request timeout and user
//! agent, and turns transport failures and non-success statuses into
//! [`WikiliteError`]s carrying the request URL.

use crate::config::{AppConfig, SearchConfig};
use crate::{Result, WikiliteError};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// HTTP client with a fixed default timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_timeout(SearchConfig::REQUEST_TIMEOUT)
    }

    /// Create a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(AppConfig::USER_AGENT)
            .build()
            .map_err(|e| WikiliteError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Make a GET request.
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error("GET", url, e))?;

        Self::check_response_status(response, url)
    }

    /// Make a POST request with JSON body.
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<Response> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error("POST", url, e))?;

        Self::check_response_status(response, url)
    }

    fn transport_error(&self, method: &str, url: &str, err: reqwest::Error) -> WikiliteError {
        if err.is_timeout() {
            return WikiliteError::Timeout(self.timeout);
        }
        WikiliteError::Network {
            message: format!("{} {} failed: {}", method, url, err),
            cause: std::error::Error::source(&err).map(|s| s.to_string()),
        }
    }

    fn check_response_status(response: Response, url: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(WikiliteError::Network {
            message: format!("{} returned HTTP {}", url, status),
            cause: status.canonical_reason().map(str::to_string),
        })
    }
}
