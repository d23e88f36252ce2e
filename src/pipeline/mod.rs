//! Mention processing pipeline.
//!
//! Every run flows through:
//! 1. `SocialFeed::list_mentions()` — platform I/O
//! 2. `MentionProcessor::process()` — recency and dedup filters, then
//!    resolve → fetch → decode → classify → compose per mention
//! 3. `ActionSink::execute()` — mark and reply on the platform
//!
//! The platform's mark flag is the only dedup state. Nothing is cached
//! between runs.

pub mod composer;
pub mod media;
pub mod processor;
pub mod run;
pub mod sink;
pub mod types;

pub use composer::{PhrasingPools, ResponseComposer};
pub use processor::MentionProcessor;
pub use run::{RunReport, run_once};
pub use sink::{ActionSink, SinkReport};
pub use types::{
    Action, ClassificationLabel, MarkAction, MediaLocator, Mention, MentionFailure,
    ProcessedBatch, ReplyAction, SocialFeed,
};
