//! Action sink — performs emitted actions against the social feed.
//!
//! Best effort: a failed mark or reply is logged and the sink moves on. A
//! failed mark means the mention may be processed again next run, which the
//! pipeline tolerates.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::PlatformError;
use crate::pipeline::types::{Action, SocialFeed};

/// Counts of effects performed by one `ActionSink::execute` call.
#[derive(Debug, Default)]
pub struct SinkReport {
    pub marked: usize,
    pub replied: usize,
    pub failures: Vec<PlatformError>,
}

pub struct ActionSink {
    feed: Arc<dyn SocialFeed>,
}

impl ActionSink {
    pub fn new(feed: Arc<dyn SocialFeed>) -> Self {
        Self { feed }
    }

    /// Perform each action once, in order. Nothing is retried.
    pub async fn execute(&self, actions: &[Action]) -> SinkReport {
        let mut report = SinkReport::default();

        for action in actions {
            let result = match action {
                Action::Mark(mark) => self.feed.mark_processed(&mark.target_mention_id).await,
                Action::Reply(reply) => {
                    self.feed
                        .post_reply(&reply.target_mention_id, &reply.text)
                        .await
                }
            };

            match result {
                Ok(()) => {
                    debug!(
                        feed = self.feed.name(),
                        id = %action.target_mention_id(),
                        action = action.label(),
                        "Action performed"
                    );
                    match action {
                        Action::Mark(_) => report.marked += 1,
                        Action::Reply(_) => report.replied += 1,
                    }
                }
                Err(e) => {
                    warn!(
                        feed = self.feed.name(),
                        id = %action.target_mention_id(),
                        action = action.label(),
                        error = %e,
                        "Action failed — continuing"
                    );
                    report.failures.push(e);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::pipeline::types::Mention;

    /// Feed that records calls and fails for configured mention ids.
    #[derive(Default)]
    struct RecordingFeed {
        calls: Mutex<Vec<String>>,
        fail_mark: HashSet<String>,
        fail_reply: HashSet<String>,
    }

    #[async_trait]
    impl SocialFeed for RecordingFeed {
        fn name(&self) -> &str {
            "recording"
        }

        async fn list_mentions(&self, _since_id: Option<&str>) -> Result<Vec<Mention>, PlatformError> {
            Ok(vec![])
        }

        async fn mark_processed(&self, mention_id: &str) -> Result<(), PlatformError> {
            self.calls.lock().await.push(format!("mark:{mention_id}"));
            if self.fail_mark.contains(mention_id) {
                return Err(PlatformError::MarkFailed {
                    id: mention_id.to_string(),
                    reason: "rate limited".to_string(),
                });
            }
            Ok(())
        }

        async fn post_reply(&self, mention_id: &str, text: &str) -> Result<(), PlatformError> {
            self.calls
                .lock()
                .await
                .push(format!("reply:{mention_id}:{text}"));
            if self.fail_reply.contains(mention_id) {
                return Err(PlatformError::ReplyFailed {
                    id: mention_id.to_string(),
                    reason: "duplicate status".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn executes_actions_in_order() {
        let feed = Arc::new(RecordingFeed::default());
        let sink = ActionSink::new(feed.clone());
        let actions = vec![
            Action::mark("1"),
            Action::reply("1", "hi"),
            Action::mark("2"),
        ];

        let report = sink.execute(&actions).await;

        assert_eq!(report.marked, 2);
        assert_eq!(report.replied, 1);
        assert!(report.failures.is_empty());
        assert_eq!(
            *feed.calls.lock().await,
            vec!["mark:1", "reply:1:hi", "mark:2"]
        );
    }

    #[tokio::test]
    async fn failed_mark_does_not_stop_later_actions() {
        let feed = Arc::new(RecordingFeed {
            fail_mark: HashSet::from(["1".to_string()]),
            ..Default::default()
        });
        let sink = ActionSink::new(feed.clone());
        let actions = vec![
            Action::mark("1"),
            Action::reply("1", "hi"),
            Action::mark("2"),
        ];

        let report = sink.execute(&actions).await;

        assert_eq!(report.marked, 1);
        assert_eq!(report.replied, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0], PlatformError::MarkFailed { .. }));
        assert_eq!(feed.calls.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn failed_reply_is_reported() {
        let feed = Arc::new(RecordingFeed {
            fail_reply: HashSet::from(["1".to_string()]),
            ..Default::default()
        });
        let sink = ActionSink::new(feed);

        let report = sink
            .execute(&[Action::mark("1"), Action::reply("1", "hi")])
            .await;

        assert_eq!(report.marked, 1);
        assert_eq!(report.replied, 0);
        assert!(matches!(report.failures[0], PlatformError::ReplyFailed { .. }));
    }

    #[tokio::test]
    async fn empty_action_list_does_nothing() {
        let feed = Arc::new(RecordingFeed::default());
        let sink = ActionSink::new(feed.clone());
        let report = sink.execute(&[]).await;
        assert_eq!(report.marked + report.replied, 0);
        assert!(feed.calls.lock().await.is_empty());
    }
}
