//! Image fetcher — downloads raw image bytes for a locator.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;
use crate::pipeline::types::MediaLocator;

/// Retrieves raw image bytes. Implementations must not retry.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, locator: &MediaLocator) -> Result<Vec<u8>, FetchError>;
}

/// HTTP(S) fetcher backed by a shared `reqwest` client.
pub struct HttpImageFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpImageFetcher {
    /// Build a fetcher whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    fn map_error(&self, url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, locator: &MediaLocator) -> Result<Vec<u8>, FetchError> {
        let url = locator.as_str();

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| self.map_error(url, e))?;
        debug!(url = %url, size = bytes.len(), "Fetched image");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_request_failure() {
        let fetcher = HttpImageFetcher::new(Duration::from_secs(2)).unwrap();
        // Port 9 on loopback is the discard service; nothing listens there in CI.
        let locator = MediaLocator::new("http://127.0.0.1:9/graph.png");
        let err = fetcher.fetch(&locator).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::RequestFailed { .. } | FetchError::Timeout { .. }
        ));
    }

    #[tokio::test]
    async fn malformed_url_is_request_failure() {
        let fetcher = HttpImageFetcher::new(Duration::from_secs(2)).unwrap();
        let err = fetcher
            .fetch(&MediaLocator::new("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::RequestFailed { .. }));
    }
}
