//! The per-frame pass shared by all three modes.

use camera_capture::Frame;
use detector::{filter_detections, CanonicalDetection, ClassLabelMap, DetectorError, HazardModel};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::enhance::enhance;

/// Output of one frame through the pass.
pub struct FramePass {
    /// Enhanced, annotated display frame.
    pub frame: Frame,
    pub detections: Vec<CanonicalDetection>,
    /// Inference exceeded its deadline on this frame. The annotated frame
    /// carries zero detections; stream sessions drop the chunk entirely.
    pub timed_out: bool,
}

/// Runs enhancement, inference, filtering, and annotation on one frame.
///
/// Inference failures never escape here: a deadline overrun is flagged on
/// the result, any other model error degrades to zero detections so the
/// caller still gets a drawable frame.
pub(crate) fn run_frame_pass(
    frame: &Frame,
    model: &dyn HazardModel,
    labels: &ClassLabelMap,
    config: &PipelineConfig,
) -> FramePass {
    let enhanced = enhance(frame, &config.enhance);

    let mut timed_out = false;
    let raw = match model.infer(&enhanced, &config.detector.params()) {
        Ok(raw) => raw,
        Err(DetectorError::Timeout {
            elapsed_ms,
            deadline_ms,
        }) => {
            warn!(
                sequence = frame.sequence,
                elapsed_ms, deadline_ms, "inference deadline exceeded"
            );
            timed_out = true;
            Vec::new()
        }
        Err(DetectorError::Unavailable) => {
            debug!(sequence = frame.sequence, "no model loaded, frame passes through");
            Vec::new()
        }
        Err(e) => {
            warn!(sequence = frame.sequence, "inference failed: {e}");
            Vec::new()
        }
    };

    let detections = filter_detections(&raw, config.detector.min_box_area, labels);
    let annotated = annotator::annotate(&enhanced, &detections);

    FramePass {
        frame: annotated,
        detections,
        timed_out,
    }
}
