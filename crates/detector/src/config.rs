//! Detector configuration.

use serde::{Deserialize, Serialize};

/// Configuration for model loading and detection post-processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Path to the ONNX model file. `None` runs the pipeline without a model.
    pub model_path: Option<String>,
    /// Minimum confidence for a detection to be kept.
    pub confidence_threshold: f32,
    /// IoU threshold above which overlapping boxes are suppressed.
    pub iou_threshold: f32,
    /// Square side length the model expects, in pixels.
    pub input_size: u32,
    /// Minimum bounding-box area in source-image pixels.
    pub min_box_area: f32,
    /// Class names in model output order, used when the label map has no entry.
    pub class_names: Vec<String>,
    /// Soft deadline for a single inference call.
    pub infer_deadline_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            input_size: 640,
            min_box_area: 1000.0,
            class_names: vec!["smoke".to_string(), "fire".to_string()],
            infer_deadline_ms: 2000,
        }
    }
}

impl DetectorConfig {
    /// The subset of settings an inference call needs.
    pub fn params(&self) -> InferenceParams {
        InferenceParams {
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            input_size: self.input_size,
        }
    }
}

/// Per-call inference settings, separated from model lifecycle config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InferenceParams {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub input_size: u32,
}
