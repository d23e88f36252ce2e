//! Shared types for the mention processing pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MentionError, PlatformError};

// ── Inbound mention ─────────────────────────────────────────────────

/// A reference to an image resource attached to a mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaLocator(pub String);

impl MediaLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inbound message referencing the bot account.
///
/// `id` is the idempotency key across runs. `already_processed` mirrors the
/// platform's mark flag and is never cached locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "favorited")]
    pub already_processed: bool,
    /// Attached images in platform order. Only the first is ever used.
    #[serde(default)]
    pub media: Vec<MediaLocator>,
}

impl Mention {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            already_processed: false,
            media: Vec::new(),
        }
    }

    pub fn with_media(mut self, locator: impl Into<String>) -> Self {
        self.media.push(MediaLocator::new(locator));
        self
    }

    pub fn processed(mut self) -> Self {
        self.already_processed = true;
        self
    }
}

// ── Classification ──────────────────────────────────────────────────

/// Classifier outcome for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationLabel {
    Annotated,
    NotAnnotated,
    Unknown,
}

impl ClassificationLabel {
    /// Map a raw model label ("Yes" / "No") to a label.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Self::Annotated,
            "no" => Self::NotAnnotated,
            _ => Self::Unknown,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Annotated => "annotated",
            Self::NotAnnotated => "not_annotated",
            Self::Unknown => "unknown",
        }
    }
}

// ── Actions ─────────────────────────────────────────────────────────

/// Intent to record a mention as handled on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkAction {
    pub target_mention_id: String,
}

/// Intent to post a reply to a mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyAction {
    pub target_mention_id: String,
    pub text: String,
}

/// A side effect the pipeline wants performed, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Mark(MarkAction),
    Reply(ReplyAction),
}

impl Action {
    pub fn mark(id: impl Into<String>) -> Self {
        Self::Mark(MarkAction {
            target_mention_id: id.into(),
        })
    }

    pub fn reply(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Reply(ReplyAction {
            target_mention_id: id.into(),
            text: text.into(),
        })
    }

    pub fn target_mention_id(&self) -> &str {
        match self {
            Self::Mark(m) => &m.target_mention_id,
            Self::Reply(r) => &r.target_mention_id,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mark(_) => "mark",
            Self::Reply(_) => "reply",
        }
    }
}

// ── Processing result ───────────────────────────────────────────────

/// A mention that degraded to "marked, no reply".
#[derive(Debug)]
pub struct MentionFailure {
    pub mention_id: String,
    pub error: MentionError,
}

/// Output of one `MentionProcessor::process` call.
#[derive(Debug, Default)]
pub struct ProcessedBatch {
    /// Actions in emission order: per mention, Mark then optional Reply.
    pub actions: Vec<Action>,
    /// Per-mention fetch/decode/classifier failures.
    pub failures: Vec<MentionFailure>,
    /// Mentions that passed the recency filter and were not already marked.
    pub considered: usize,
}

impl ProcessedBatch {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// ── Social feed trait ───────────────────────────────────────────────

/// The three platform operations the pipeline needs. Pure I/O.
#[async_trait]
pub trait SocialFeed: Send + Sync {
    /// Feed name for logging (e.g. "http").
    fn name(&self) -> &str;

    /// List mentions of the bot account, optionally newer than `since_id`.
    async fn list_mentions(&self, since_id: Option<&str>) -> Result<Vec<Mention>, PlatformError>;

    /// Record a mention as handled. This flag is the only durable dedup state.
    async fn mark_processed(&self, mention_id: &str) -> Result<(), PlatformError>;

    /// Post a reply to a mention.
    async fn post_reply(&self, mention_id: &str, text: &str) -> Result<(), PlatformError>;
}
