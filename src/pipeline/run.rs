//! One complete bot run: list → process → perform actions.

use std::sync::Arc;

use chrono::Utc;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::error::PlatformError;
use crate::pipeline::processor::MentionProcessor;
use crate::pipeline::sink::ActionSink;
use crate::pipeline::types::{MentionFailure, SocialFeed};

/// Summary of one run, for logging and tests.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Mentions returned by the feed.
    pub listed: usize,
    /// Mentions that were recent and not yet marked.
    pub considered: usize,
    pub marked: usize,
    pub replied: usize,
    pub mention_failures: Vec<MentionFailure>,
    pub platform_failures: Vec<PlatformError>,
}

/// Run the pipeline once against `feed`.
///
/// Listing failures abort the run. Everything after listing is best effort
/// and reported in the returned `RunReport`.
pub async fn run_once(
    feed: Arc<dyn SocialFeed>,
    processor: &MentionProcessor,
    since_id: Option<&str>,
) -> Result<RunReport, PlatformError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("run", run_id = %run_id, feed = feed.name());

    async move {
        let mentions = feed.list_mentions(since_id).await?;
        let listed = mentions.len();
        info!(listed, since_id = since_id.unwrap_or("-"), "Listed mentions");

        let batch = processor
            .process(mentions, Utc::now(), processor.config().recency_window)
            .await;

        let sink = ActionSink::new(Arc::clone(&feed));
        let sink_report = sink.execute(&batch.actions).await;

        let report = RunReport {
            run_id,
            listed,
            considered: batch.considered,
            marked: sink_report.marked,
            replied: sink_report.replied,
            mention_failures: batch.failures,
            platform_failures: sink_report.failures,
        };

        if report.mention_failures.is_empty() && report.platform_failures.is_empty() {
            info!(
                considered = report.considered,
                marked = report.marked,
                replied = report.replied,
                "Run complete"
            );
        } else {
            warn!(
                considered = report.considered,
                marked = report.marked,
                replied = report.replied,
                mention_failures = report.mention_failures.len(),
                platform_failures = report.platform_failures.len(),
                "Run complete with failures"
            );
        }

        Ok(report)
    }
    .instrument(span)
    .await
}
