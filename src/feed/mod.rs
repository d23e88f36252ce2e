//! Social feed adapters.

pub mod http;

pub use http::HttpFeed;
