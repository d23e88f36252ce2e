//! graph-checker — replies to mentions with an image-classification verdict.

pub mod classifier;
pub mod config;
pub mod error;
pub mod feed;
pub mod media;
pub mod pipeline;
