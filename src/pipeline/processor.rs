//! Mention processor — turns a batch of mentions into mark/reply actions.
//!
//! **Core invariant: every considered mention is marked exactly once.**
//! A mention that fails to fetch, decode, or classify is still marked so the
//! next run does not retry it forever; it just gets no reply.
//!
//! Flow per run:
//! 1. Recency filter → drop stale mentions
//! 2. Dedup filter → skip mentions the platform already marked
//! 3. Resolve → fetch → decode → classify → compose
//! 4. Emit `Mark` then optional `Reply`, in mention arrival order

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures::StreamExt;
use futures::stream;
use tracing::{debug, error, info};

use crate::classifier::Classifier;
use crate::config::PipelineConfig;
use crate::error::{ClassifierError, FetchError, MentionError};
use crate::media::{ImageFetcher, decode_image};
use crate::pipeline::composer::ResponseComposer;
use crate::pipeline::media;
use crate::pipeline::types::{
    Action, ClassificationLabel, MediaLocator, Mention, MentionFailure, ProcessedBatch,
};

/// What happened to one mention that made it past both filters.
struct MentionOutcome {
    mention_id: String,
    reply: Option<String>,
    failure: Option<MentionError>,
}

/// Mention processor — the pipeline's state machine.
///
/// Holds no state between calls; dedup is entirely the platform's mark flag.
pub struct MentionProcessor {
    fetcher: Arc<dyn ImageFetcher>,
    classifier: Arc<dyn Classifier>,
    composer: Arc<ResponseComposer>,
    config: PipelineConfig,
}

impl MentionProcessor {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        classifier: Arc<dyn Classifier>,
        composer: Arc<ResponseComposer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            composer,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process a batch of mentions and return the actions to perform.
    ///
    /// Per-mention failures never abort the batch; they are logged and
    /// collected in `ProcessedBatch::failures`.
    pub async fn process(
        &self,
        mentions: Vec<Mention>,
        now: DateTime<Utc>,
        recency_window: Duration,
    ) -> ProcessedBatch {
        let total = mentions.len();
        let recent = filter_recent(mentions, now, recency_window);

        if recent.is_empty() {
            debug!(total, "No recent mentions — nothing to do");
            return ProcessedBatch::default();
        }

        let candidates: Vec<Mention> = recent
            .into_iter()
            .filter(|m| {
                if m.already_processed {
                    debug!(id = %m.id, "Mention already marked — skipping");
                }
                !m.already_processed
            })
            .collect();

        info!(
            total,
            candidates = candidates.len(),
            "Processing mention batch"
        );

        // `buffered` yields in input order regardless of completion order.
        let outcomes: Vec<MentionOutcome> = stream::iter(candidates)
            .map(|mention| self.evaluate(mention))
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut batch = ProcessedBatch {
            actions: Vec::with_capacity(outcomes.len() * 2),
            failures: Vec::new(),
            considered: outcomes.len(),
        };

        for outcome in outcomes {
            batch.actions.push(Action::mark(outcome.mention_id.clone()));
            if let Some(text) = outcome.reply {
                batch.actions.push(Action::reply(outcome.mention_id.clone(), text));
            }
            if let Some(error) = outcome.failure {
                batch.failures.push(MentionFailure {
                    mention_id: outcome.mention_id,
                    error,
                });
            }
        }

        info!(
            considered = batch.considered,
            actions = batch.actions.len(),
            failures = batch.failures.len(),
            "Mention batch processed"
        );
        batch
    }

    /// Decide the reply (if any) for one unmarked, recent mention.
    async fn evaluate(&self, mention: Mention) -> MentionOutcome {
        let Some(locator) = media::resolve(&mention) else {
            info!(id = %mention.id, "Mention has no image — sending canned reply");
            return MentionOutcome {
                mention_id: mention.id,
                reply: Some(self.composer.no_media_reply()),
                failure: None,
            };
        };

        if mention.media.len() > 1 {
            debug!(
                id = %mention.id,
                ignored = mention.media.len() - 1,
                "Only the first image is classified"
            );
        }

        match self.classify_locator(locator).await {
            Ok(label) => {
                let reply = self.composer.compose(label);
                info!(
                    id = %mention.id,
                    label = label.label(),
                    replying = reply.is_some(),
                    "Classified mention image"
                );
                MentionOutcome {
                    mention_id: mention.id,
                    reply,
                    failure: None,
                }
            }
            Err(e) => {
                error!(
                    id = %mention.id,
                    locator = %locator,
                    kind = e.kind(),
                    error = %e,
                    "Failed to classify mention image — marking without reply"
                );
                MentionOutcome {
                    mention_id: mention.id,
                    reply: None,
                    failure: Some(e),
                }
            }
        }
    }

    /// Fetch, decode and classify one image, each step bounded by a timeout.
    async fn classify_locator(
        &self,
        locator: &MediaLocator,
    ) -> Result<ClassificationLabel, MentionError> {
        let fetch_timeout = self.config.fetch_timeout;
        let bytes = tokio::time::timeout(fetch_timeout, self.fetcher.fetch(locator))
            .await
            .map_err(|_| FetchError::Timeout {
                url: locator.to_string(),
                timeout: fetch_timeout,
            })??;

        let classifier = Arc::clone(&self.classifier);
        let task = tokio::task::spawn_blocking(move || -> Result<_, MentionError> {
            let image = decode_image(&bytes)?;
            Ok(classifier.classify(&image)?)
        });

        let classify_timeout = self.config.classify_timeout;
        tokio::time::timeout(classify_timeout, task)
            .await
            .map_err(|_| ClassifierError::Timeout(classify_timeout))?
            .map_err(|e| ClassifierError::TaskAborted(e.to_string()))?
    }
}

/// Keep mentions no older than `window`, sorted by arrival (oldest first).
///
/// Mentions stamped in the future are kept.
pub fn filter_recent(mentions: Vec<Mention>, now: DateTime<Utc>, window: Duration) -> Vec<Mention> {
    let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
    let mut recent: Vec<Mention> = mentions
        .into_iter()
        .filter(|m| {
            let keep = now.signed_duration_since(m.created_at) <= window;
            if !keep {
                debug!(id = %m.id, created_at = %m.created_at, "Mention outside recency window");
            }
            keep
        })
        .collect();
    recent.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    recent
}
