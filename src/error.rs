//! Error types for graph-checker.

use std::time::Duration;

/// Top-level error type for a bot run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Social feed errors (listing, marking, replying).
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Listing mentions failed: {0}")]
    ListFailed(String),

    #[error("Marking mention {id} failed: {reason}")]
    MarkFailed { id: String, reason: String },

    #[error("Replying to mention {id} failed: {reason}")]
    ReplyFailed { id: String, reason: String },

    #[error("Invalid response from feed: {0}")]
    InvalidResponse(String),

    #[error("Feed client setup failed: {0}")]
    Client(String),
}

/// Image retrieval errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Image decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Image data is empty")]
    Empty,

    #[error("Unsupported or corrupt image: {0}")]
    Unsupported(#[from] image::ImageError),
}

/// Classifier errors (model loading and invocation).
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid model signature: {0}")]
    InvalidSignature(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Classification timed out after {0:?}")]
    Timeout(Duration),

    #[error("Classifier task aborted: {0}")]
    TaskAborted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single mention degraded to "marked, no reply".
#[derive(Debug, thiserror::Error)]
pub enum MentionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

impl MentionError {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Decode(_) => "decode",
            Self::Classifier(_) => "classifier",
        }
    }
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
