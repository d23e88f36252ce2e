//! Media resolution — does a mention carry a classifiable image?

use crate::pipeline::types::{MediaLocator, Mention};

/// First attached image, or `None` when the mention has no media.
///
/// Any further images are ignored; only one image per mention is classified.
pub fn resolve(mention: &Mention) -> Option<&MediaLocator> {
    mention.media.first()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn no_media_resolves_to_none() {
        let mention = Mention::new("1", Utc::now());
        assert!(resolve(&mention).is_none());
    }

    #[test]
    fn single_image_resolves() {
        let mention = Mention::new("2", Utc::now()).with_media("https://img/a.png");
        assert_eq!(resolve(&mention).map(MediaLocator::as_str), Some("https://img/a.png"));
    }

    #[test]
    fn only_first_image_is_used() {
        let mention = Mention::new("3", Utc::now())
            .with_media("https://img/first.png")
            .with_media("https://img/second.png");
        assert_eq!(
            resolve(&mention).map(MediaLocator::as_str),
            Some("https://img/first.png")
        );
    }
}
