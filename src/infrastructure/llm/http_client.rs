use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

/// Longest slice of an error body kept in the error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// JSON-over-HTTP transport used by the provider clients
#[async_trait]
pub trait HttpClientTrait: Send + Sync + Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: Value,
    ) -> Result<Value, DomainError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose requests fail after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map(|inner| Self { inner })
            .map_err(|e| DomainError::configuration(format!("Cannot build HTTP client: {}", e)))
    }
}

fn transport_error(url: &str, error: reqwest::Error) -> DomainError {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };

    DomainError::provider("http", format!("POST {} {}: {}", url, kind, error))
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: Value,
    ) -> Result<Value, DomainError> {
        let request = headers
            .iter()
            .fold(self.inner.post(url), |req, (name, value)| {
                req.header(*name, value.as_str())
            });

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let excerpt: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();

            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status.as_u16(), excerpt),
            ));
        }

        response.json::<Value>().await.map_err(|e| {
            DomainError::provider("http", format!("Response from {} is not JSON: {}", url, e))
        })
    }
}
