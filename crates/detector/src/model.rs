//! Model abstraction for hazard inference.

use camera_capture::Frame;

use crate::config::InferenceParams;
use crate::detection::RawDetection;
use crate::DetectorError;

/// A hazard detection model.
///
/// Implementations run inference on an RGB frame and return raw detections
/// in source-image coordinates. The pipeline owns confidence and IoU
/// settings and passes them per call.
pub trait HazardModel: Send + Sync {
    /// Runs inference on one frame.
    fn infer(
        &self,
        frame: &Frame,
        params: &InferenceParams,
    ) -> Result<Vec<RawDetection>, DetectorError>;

    /// Whether a model is loaded and ready to serve [`infer`](Self::infer).
    fn is_available(&self) -> bool;
}
