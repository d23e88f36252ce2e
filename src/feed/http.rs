//! HTTP feed — talks to a JSON gateway in front of the social platform.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  /mentions?since_id=…` → `{"mentions": [Mention, …]}`
//! - `POST /mentions/{id}/mark`
//! - `POST /mentions/{id}/reply` with `{"text": "…"}`
//!
//! Authentication is a bearer token; everything platform-specific lives
//! behind the gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::PlatformError;
use crate::pipeline::types::{Mention, SocialFeed};

#[derive(Debug, Deserialize)]
struct MentionsResponse {
    #[serde(default)]
    mentions: Vec<Mention>,
}

pub struct HttpFeed {
    base_url: Url,
    token: SecretString,
    client: reqwest::Client,
}

impl HttpFeed {
    /// Build a feed client. Every gateway request is bounded by `timeout`.
    pub fn new(
        base_url: &str,
        token: SecretString,
        timeout: Duration,
    ) -> Result<Self, PlatformError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| PlatformError::Client(format!("invalid base URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PlatformError::Client(format!(
                "base URL {base_url} cannot carry a path"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Client(e.to_string()))?;

        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    /// Base URL with `segments` appended. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `#` stay a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn mention_url(&self, mention_id: &str, action: &str) -> Url {
        self.endpoint(&["mentions", mention_id, action])
    }

    async fn post(&self, url: Url, body: serde_json::Value) -> Result<(), String> {
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("{status}: {text}"));
        }
        Ok(())
    }
}

#[async_trait]
impl SocialFeed for HttpFeed {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_mentions(&self, since_id: Option<&str>) -> Result<Vec<Mention>, PlatformError> {
        let mut req = self
            .client
            .get(self.endpoint(&["mentions"]))
            .bearer_auth(self.token.expose_secret());
        if let Some(since_id) = since_id {
            req = req.query(&[("since_id", since_id)]);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PlatformError::ListFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PlatformError::ListFailed(format!("{status}: {text}")));
        }

        let body: MentionsResponse = resp
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;

        debug!(count = body.mentions.len(), "Fetched mentions from gateway");
        Ok(body.mentions)
    }

    async fn mark_processed(&self, mention_id: &str) -> Result<(), PlatformError> {
        self.post(self.mention_url(mention_id, "mark"), serde_json::json!({}))
            .await
            .map_err(|reason| PlatformError::MarkFailed {
                id: mention_id.to_string(),
                reason,
            })
    }

    async fn post_reply(&self, mention_id: &str, text: &str) -> Result<(), PlatformError> {
        self.post(
            self.mention_url(mention_id, "reply"),
            serde_json::json!({ "text": text }),
        )
        .await
        .map_err(|reason| PlatformError::ReplyFailed {
            id: mention_id.to_string(),
            reason,
        })
    }
}
