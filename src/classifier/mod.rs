//! Image classification.
//!
//! The pipeline sees a single capability, `Classifier::classify`. The
//! concrete backend is chosen once at startup; there is no registry.

pub mod onnx;
pub mod signature;

pub use onnx::OnnxClassifier;
pub use signature::Signature;

use crate::error::ClassifierError;
use crate::media::DecodedImage;
use crate::pipeline::types::ClassificationLabel;

/// Maps a decoded image to a label. Blocking; callers run it off the async
/// executor.
pub trait Classifier: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    fn classify(&self, image: &DecodedImage) -> Result<ClassificationLabel, ClassifierError>;
}
