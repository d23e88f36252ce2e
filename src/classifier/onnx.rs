//! ONNX Runtime classifier for exported image-classification models.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Mutex;

use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::Array4;
use ort::session::{Session, SessionInputValue, SessionOutputs};
use tracing::{debug, info};

use crate::classifier::{Classifier, Signature};
use crate::error::ClassifierError;
use crate::media::DecodedImage;
use crate::pipeline::types::ClassificationLabel;

/// Classifier backed by an ONNX model and its `signature.json`.
///
/// Loading the session is expensive: build one per run, share it behind an
/// `Arc`, and drop it when the run ends.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    confidences_name: String,
    input_size: (u32, u32),
    classes: Vec<String>,
}

impl OnnxClassifier {
    /// Load the signature, then the model file it names.
    pub fn from_signature_file(signature_path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let signature_path = signature_path.as_ref();
        let signature = Signature::load(signature_path)?;
        let model_path = signature.model_path(signature_path);

        if !model_path.exists() {
            return Err(ClassifierError::ModelNotFound(
                model_path.display().to_string(),
            ));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let input_size = signature.input_size()?;
        info!(
            model = %model_path.display(),
            width = input_size.0,
            height = input_size.1,
            classes = ?signature.classes.label,
            "Loaded ONNX classifier"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name: signature.image_input()?.name.clone(),
            confidences_name: signature.confidences_output()?.name.clone(),
            input_size,
            classes: signature.classes.label.clone(),
        })
    }

    /// Raw class label string for an image (e.g. "Yes" / "No").
    pub fn predict_label(&self, image: &DecodedImage) -> Result<String, ClassifierError> {
        let tensor = preprocess(image.as_rgb(), self.input_size);
        let scores = self.run_inference(tensor)?;
        let label = argmax_label(&scores, &self.classes)?;
        debug!(label = %label, scores = ?scores, "Classified image");
        Ok(label.to_string())
    }

    fn run_inference(&self, input_tensor: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let input_value = ort::value::Value::from_array(input_tensor)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let inputs: Vec<(Cow<'_, str>, SessionInputValue<'_>)> = vec![(
            Cow::Borrowed(self.input_name.as_str()),
            SessionInputValue::from(input_value),
        )];

        // Running needs `&mut Session`.
        let mut session = self
            .session
            .lock()
            .map_err(|e| ClassifierError::Inference(format!("Failed to lock session: {}", e)))?;

        let outputs: SessionOutputs = session
            .run(inputs)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let output = outputs.get(self.confidences_name.as_str()).ok_or_else(|| {
            ClassifierError::Inference(format!("No output tensor '{}'", self.confidences_name))
        })?;

        let (_, scores) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        Ok(scores.to_vec())
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn classify(&self, image: &DecodedImage) -> Result<ClassificationLabel, ClassifierError> {
        self.predict_label(image)
            .map(|raw| ClassificationLabel::from_raw(&raw))
    }
}

/// Center-crop to a square, resize to the model input, and scale to `[0, 1]`.
///
/// Returns an NHWC tensor `[1, height, width, 3]`.
fn preprocess(img: &RgbImage, (width, height): (u32, u32)) -> Array4<f32> {
    let (w, h) = img.dimensions();
    let side = w.min(h);
    let square = if w != h {
        imageops::crop_imm(img, (w - side) / 2, (h - side) / 2, side, side).to_image()
    } else {
        img.clone()
    };

    let resized = if square.dimensions() != (width, height) {
        imageops::resize(&square, width, height, FilterType::Triangle)
    } else {
        square
    };

    let mut tensor = Array4::<f32>::zeros((1, height as usize, width as usize, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = pixel[c] as f32 / 255.0;
        }
    }
    tensor
}

/// Class label with the highest score.
fn argmax_label<'a>(scores: &[f32], classes: &'a [String]) -> Result<&'a str, ClassifierError> {
    let (idx, _) = scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
        .ok_or_else(|| ClassifierError::Inference("model returned no scores".to_string()))?;

    classes.get(idx).map(String::as_str).ok_or_else(|| {
        ClassifierError::Inference(format!(
            "score index {idx} out of range for {} classes",
            classes.len()
        ))
    })
}
