//! Model signature file (`signature.json`) exported alongside an ONNX model.
//!
//! Only the fields the classifier needs are read:
//!
//! ```json
//! {
//!   "filename": "model.onnx",
//!   "classes": { "Label": ["No", "Yes"] },
//!   "inputs":  { "Image": { "name": "Image:0", "shape": [null, 224, 224, 3] } },
//!   "outputs": { "Confidences": { "name": "sequential/dense/Softmax:0" } }
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ClassifierError;

/// Input key the model must expose.
const IMAGE_INPUT: &str = "Image";

/// Output key carrying per-class probabilities.
const CONFIDENCES_OUTPUT: &str = "Confidences";

#[derive(Debug, Clone, Deserialize)]
pub struct TensorSpec {
    pub name: String,
    #[serde(default)]
    pub shape: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Classes {
    #[serde(rename = "Label")]
    pub label: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signature {
    pub filename: String,
    pub classes: Classes,
    pub inputs: HashMap<String, TensorSpec>,
    pub outputs: HashMap<String, TensorSpec>,
}

impl Signature {
    /// Read and validate a signature file.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path)?;
        let signature: Self = serde_json::from_str(&raw)?;
        signature.validate()?;
        Ok(signature)
    }

    /// Model file path, resolved relative to the signature's directory.
    pub fn model_path(&self, signature_path: &Path) -> PathBuf {
        let dir = signature_path.parent().unwrap_or_else(|| Path::new("."));
        dir.join(&self.filename)
    }

    pub fn image_input(&self) -> Result<&TensorSpec, ClassifierError> {
        self.inputs.get(IMAGE_INPUT).ok_or_else(|| {
            ClassifierError::InvalidSignature(format!("model has no '{IMAGE_INPUT}' input"))
        })
    }

    pub fn confidences_output(&self) -> Result<&TensorSpec, ClassifierError> {
        self.outputs.get(CONFIDENCES_OUTPUT).ok_or_else(|| {
            ClassifierError::InvalidSignature(format!(
                "model has no '{CONFIDENCES_OUTPUT}' output"
            ))
        })
    }

    /// `(width, height)` the model expects, from an NHWC input shape.
    pub fn input_size(&self) -> Result<(u32, u32), ClassifierError> {
        let shape = &self.image_input()?.shape;
        let dim = |i: usize| -> Result<u32, ClassifierError> {
            shape
                .get(i)
                .copied()
                .flatten()
                .filter(|d| *d > 0)
                .and_then(|d| u32::try_from(d).ok())
                .ok_or_else(|| {
                    ClassifierError::InvalidSignature(format!(
                        "image input shape {shape:?} has no fixed dimension {i}"
                    ))
                })
        };
        let height = dim(1)?;
        let width = dim(2)?;
        Ok((width, height))
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        self.input_size()?;
        self.confidences_output()?;
        if self.classes.label.is_empty() {
            return Err(ClassifierError::InvalidSignature(
                "class label list is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const LOBE_SIGNATURE: &str = r#"{
        "doc_id": "b0f0c6a4",
        "format": "onnx",
        "filename": "model.onnx",
        "classes": { "Label": ["No", "Yes"] },
        "inputs": {
            "Image": { "dtype": "float32", "shape": [null, 224, 224, 3], "name": "Image:0" }
        },
        "outputs": {
            "Confidences": { "dtype": "float32", "shape": [null, 2], "name": "sequential/dense/Softmax:0" },
            "Label": { "dtype": "string", "shape": [null], "name": "Label" }
        }
    }"#;

    fn write_signature(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signature.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_lobe_signature() {
        let (_dir, path) = write_signature(LOBE_SIGNATURE);
        let sig = Signature::load(&path).unwrap();
        assert_eq!(sig.filename, "model.onnx");
        assert_eq!(sig.classes.label, vec!["No", "Yes"]);
        assert_eq!(sig.image_input().unwrap().name, "Image:0");
        assert_eq!(
            sig.confidences_output().unwrap().name,
            "sequential/dense/Softmax:0"
        );
        assert_eq!(sig.input_size().unwrap(), (224, 224));
    }

    #[test]
    fn model_path_is_relative_to_signature() {
        let (dir, path) = write_signature(LOBE_SIGNATURE);
        let sig = Signature::load(&path).unwrap();
        assert_eq!(sig.model_path(&path), dir.path().join("model.onnx"));
    }

    #[test]
    fn non_square_input_size_is_width_height() {
        let raw = LOBE_SIGNATURE.replace("[null, 224, 224, 3]", "[null, 120, 160, 3]");
        let (_dir, path) = write_signature(&raw);
        let sig = Signature::load(&path).unwrap();
        assert_eq!(sig.input_size().unwrap(), (160, 120));
    }

    #[test]
    fn missing_image_input_rejected() {
        let raw = LOBE_SIGNATURE.replace("\"Image\":", "\"Pixels\":");
        let (_dir, path) = write_signature(&raw);
        let err = Signature::load(&path).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidSignature(_)));
    }

    #[test]
    fn dynamic_spatial_dims_rejected() {
        let raw = LOBE_SIGNATURE.replace("[null, 224, 224, 3]", "[null, null, null, 3]");
        let (_dir, path) = write_signature(&raw);
        assert!(Signature::load(&path).is_err());
    }

    #[test]
    fn malformed_json_is_json_error() {
        let (_dir, path) = write_signature("{ not json");
        assert!(matches!(
            Signature::load(&path),
            Err(ClassifierError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Signature::load(Path::new("/definitely/not/here/signature.json")).unwrap_err();
        assert!(matches!(err, ClassifierError::Io(_)));
    }
}
