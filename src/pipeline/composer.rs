//! Reply composition — turns a classification into reply text.
//!
//! Phrase pools are fixed for the life of the composer. One RNG is seeded
//! when the composer is built and shared by every call.

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::pipeline::types::ClassificationLabel;

const COMPLIMENTS: &[&str] = &[
    "Nice work!",
    "Looking sharp!",
    "Great job!",
    "Beautiful graph!",
    "Way to go!",
    "Love to see it!",
];

const BUMMERS: &[&str] = &[
    "Bummer.",
    "Oh no!",
    "Hmm.",
    "Not quite.",
    "So close.",
];

const ANNOTATED_SUFFIX: &str =
    " This graph has annotations. Thanks for making it easy to follow!";

const NOT_ANNOTATED_SUFFIX: &str = " This graph doesn't seem to have any annotations. \
     Try adding groups or notes so others can follow it.";

const NO_IMAGE_REPLY: &str = "I couldn't find an image attached to your mention. \
     Reply with a screenshot of your graph and I'll check it for annotations.";

/// Opening phrases to pick from, per outcome.
#[derive(Debug, Clone)]
pub struct PhrasingPools {
    pub compliments: Vec<String>,
    pub bummers: Vec<String>,
}

impl Default for PhrasingPools {
    fn default() -> Self {
        Self {
            compliments: COMPLIMENTS.iter().map(|s| s.to_string()).collect(),
            bummers: BUMMERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Maps labels to reply text.
pub struct ResponseComposer {
    pools: PhrasingPools,
    rng: Mutex<StdRng>,
}

impl ResponseComposer {
    /// Composer with the default pools and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_pools(PhrasingPools::default())
    }

    pub fn with_pools(pools: PhrasingPools) -> Self {
        Self {
            pools,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic composer for reproducible output.
    pub fn seeded(pools: PhrasingPools, seed: u64) -> Self {
        Self {
            pools,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Reply text for a classified image. `Unknown` gets no reply.
    pub fn compose(&self, label: ClassificationLabel) -> Option<String> {
        match label {
            ClassificationLabel::Annotated => {
                Some(format!("{}{}", self.pick(&self.pools.compliments), ANNOTATED_SUFFIX))
            }
            ClassificationLabel::NotAnnotated => {
                Some(format!("{}{}", self.pick(&self.pools.bummers), NOT_ANNOTATED_SUFFIX))
            }
            ClassificationLabel::Unknown => None,
        }
    }

    /// Fixed reply for a mention without an image.
    pub fn no_media_reply(&self) -> String {
        NO_IMAGE_REPLY.to_string()
    }

    fn pick<'a>(&self, pool: &'a [String]) -> &'a str {
        // Poisoning leaves the RNG state usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        pool.choose(&mut *rng).map(String::as_str).unwrap_or_default()
    }
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::new()
    }
}
