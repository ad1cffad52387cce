use std::time::Duration;

use jobharvest_core::error::AppError;
use jobharvest_core::traits::Fetcher;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::identity::IdentityPool;

#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    pub timeout: Duration,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Plain HTTP fetcher using reqwest.
///
/// Every request carries a freshly rotated set of browser-like headers.
/// Responses that are not HTML are rejected.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    identities: IdentityPool,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(HttpFetcherConfig::default(), IdentityPool::default())
    }

    pub fn with_config(config: HttpFetcherConfig, identities: IdentityPool) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            identities,
            timeout_secs: config.timeout.as_secs(),
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let mut request = self.client.get(url);
        for (name, value) in self.identities.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        if !is_html_content_type(&content_type) {
            return Err(AppError::HttpError(format!(
                "Unsupported content type '{content_type}'"
            )));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// A missing content type is given the benefit of the doubt.
fn is_html_content_type(content_type: &str) -> bool {
    content_type.is_empty() || content_type.contains("html")
}
