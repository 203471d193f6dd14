//! Hazard detection for camera frames.
//!
//! Wraps a YOLO-family ONNX model behind the [`HazardModel`] trait and
//! post-processes its raw output into canonical detections:
//!
//! - Class-id to label resolution via an authoritative [`ClassLabelMap`]
//! - Minimum bounding-box area filtering
//! - Confidence thresholding and class-aware non-maximum suppression
//!
//! The detector degrades gracefully: when no model file is configured the
//! [`YoloDetector`] still constructs, reports itself unavailable, and the
//! rest of the pipeline keeps running without detections.

pub mod config;
pub mod detection;
pub mod filter;
pub mod labels;
pub mod model;
pub mod yolo;

pub use config::{DetectorConfig, InferenceParams};
pub use detection::{
    has_fire, BoundingBox, CanonicalDetection, RawDetection, FIRE_LABEL, SMOKE_LABEL,
};
pub use filter::filter_detections;
pub use labels::ClassLabelMap;
pub use model::HazardModel;
pub use yolo::YoloDetector;

use thiserror::Error;

/// Errors produced while loading or running the detection model.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("no detection model is loaded")]
    Unavailable,

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("inference exceeded deadline: {elapsed_ms}ms > {deadline_ms}ms")]
    Timeout { elapsed_ms: u64, deadline_ms: u64 },

    #[error("image processing failed: {0}")]
    ImageProcessing(String),
}
