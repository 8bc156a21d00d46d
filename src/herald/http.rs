//! HTTP client abstraction for testability.

use super::types::HeraldError;
use std::future::Future;
use std::time::Duration;
use tracing::{trace, warn};

/// Default User-Agent string for herald requests.
/// The herald rejects requests that do not look like a browser.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";

/// Default per-request timeout at the transport layer.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for asynchronous HTTP GET operations.
///
/// This abstraction allows for dependency injection and easier testing by
/// enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// Returns the response body as bytes, or an error for non-success
    /// statuses and transport faults.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, HeraldError>> + Send;

    /// Performs an async HTTP GET request with custom headers.
    fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<Vec<u8>, HeraldError>> + Send;
}

/// Real HTTP client implementation using reqwest.
///
/// Uses connection pooling and TCP keepalive so that a batch of concurrent
/// detail fetches reuses warm connections instead of handshaking per
/// request.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with default configuration.
    pub fn new() -> Result<Self, HeraldError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom transport-level timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HeraldError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| HeraldError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HeraldError> {
        self.get_with_headers(url, &[]).await
    }

    async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Vec<u8>, HeraldError> {
        trace!(url, "HTTP GET starting");

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            warn!(url, error = %e, is_timeout = e.is_timeout(), "HTTP request failed");
            if e.is_timeout() {
                HeraldError::Transport(format!("request timed out: {}", e))
            } else {
                HeraldError::Transport(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "HTTP error status");
            return Err(HeraldError::Http {
                status: status.as_u16(),
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => Err(HeraldError::Transport(format!(
                "failed to read response body: {}",
                e
            ))),
        }
    }
}
