//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default recency window: mentions older than this are ignored.
const DEFAULT_RECENCY_WINDOW_HOURS: u64 = 24;

/// Default per-image fetch timeout.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default timeout for each feed gateway request.
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

/// Default per-image classification timeout.
const DEFAULT_CLASSIFY_TIMEOUT_SECS: u64 = 30;

/// Pipeline tuning knobs (no credentials, no paths).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Mentions created longer ago than this are dropped before processing.
    pub recency_window: Duration,
    /// Upper bound on a single image download.
    pub fetch_timeout: Duration,
    /// Upper bound on a single classifier invocation.
    pub classify_timeout: Duration,
    /// How many mentions may be evaluated at once. Actions keep mention order.
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recency_window: Duration::from_secs(DEFAULT_RECENCY_WINDOW_HOURS * 3600),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            classify_timeout: Duration::from_secs(DEFAULT_CLASSIFY_TIMEOUT_SECS),
            max_concurrency: 1,
        }
    }
}

/// Full bot configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Path to the classifier's `signature.json`.
    pub signature_path: PathBuf,
    /// Base URL of the social feed gateway.
    pub feed_base_url: String,
    /// Bearer credential for the feed gateway.
    pub feed_token: SecretString,
    /// Upper bound on a single list, mark, or reply request.
    pub feed_timeout: Duration,
    /// Only list mentions newer than this id, if set.
    pub since_id: Option<String>,
    /// One-shot mode: classify this image URL and exit.
    pub image_to_classify: Option<String>,
    pub pipeline: PipelineConfig,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let signature_path = PathBuf::from(require("SIG_FILE_PATH")?);
        let image_to_classify = get("IMAGE_TO_CLASSIFY");

        // The feed is not needed for one-shot classification.
        let (feed_base_url, feed_token) = if image_to_classify.is_some() {
            (
                get("FEED_BASE_URL").unwrap_or_default(),
                SecretString::from(get("FEED_API_TOKEN").unwrap_or_default()),
            )
        } else {
            (
                require("FEED_BASE_URL")?,
                SecretString::from(require("FEED_API_TOKEN")?),
            )
        };

        let recency_hours = parse_positive(&get, "RECENCY_WINDOW_HOURS", DEFAULT_RECENCY_WINDOW_HOURS)?;
        let recency_secs = recency_hours
            .checked_mul(3600)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "RECENCY_WINDOW_HOURS".to_string(),
                message: format!("{recency_hours} hours is out of range"),
            })?;
        let feed_secs = parse_positive(&get, "FEED_TIMEOUT_SECS", DEFAULT_FEED_TIMEOUT_SECS)?;
        let fetch_secs = parse_positive(&get, "FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;
        let classify_secs =
            parse_positive(&get, "CLASSIFY_TIMEOUT_SECS", DEFAULT_CLASSIFY_TIMEOUT_SECS)?;
        let max_concurrency = parse_positive(&get, "MAX_CONCURRENCY", 1)? as usize;

        Ok(Self {
            signature_path,
            feed_base_url: feed_base_url.trim_end_matches('/').to_string(),
            feed_token,
            feed_timeout: Duration::from_secs(feed_secs),
            since_id: get("MENTION_SINCE_ID"),
            image_to_classify,
            pipeline: PipelineConfig {
                recency_window: Duration::from_secs(recency_secs),
                fetch_timeout: Duration::from_secs(fetch_secs),
                classify_timeout: Duration::from_secs(classify_secs),
                max_concurrency,
            },
        })
    }
}

fn parse_positive<G>(get: &G, key: &str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    let value: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a whole number, got {raw:?}"),
    })?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
