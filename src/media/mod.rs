//! Image retrieval and decoding.
//!
//! Images are kept in memory end to end. Fetching never retries; a failed
//! fetch is final for that mention in the current run.

pub mod decode;
pub mod fetcher;

pub use decode::{DecodedImage, decode_image};
pub use fetcher::{HttpImageFetcher, ImageFetcher};
