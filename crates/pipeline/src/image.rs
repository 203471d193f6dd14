//! Single-image processing.

use alerting::AlertSource;
use camera_capture::Frame;
use detector::CanonicalDetection;
use tracing::info;

use crate::process::run_frame_pass;
use crate::{Pipeline, PipelineError};

/// Result of processing one uploaded image.
pub struct ImageOutcome {
    /// Annotated JPEG bytes.
    pub jpeg: Vec<u8>,
    /// Detections that survived filtering, in model output order.
    pub detections: Vec<CanonicalDetection>,
}

impl Pipeline {
    /// Processes one encoded image.
    ///
    /// Decodes, runs the per-frame pass, alerts on fire with the annotated
    /// snapshot attached, and returns the annotated JPEG plus the
    /// detections found.
    pub fn process_image(&self, bytes: &[u8]) -> Result<ImageOutcome, PipelineError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| PipelineError::Decode(e.to_string()))?
            .to_rgb8();

        if !self.model.is_available() {
            return Err(PipelineError::ModelUnavailable);
        }

        let frame = Frame::from_rgb_image(decoded, 0, 0);
        let pass = run_frame_pass(&frame, self.model.as_ref(), &self.labels, &self.config);

        let jpeg = annotator::encode_jpeg(&pass.frame, self.config.jpeg_quality)
            .map_err(|e| PipelineError::Encode(e.to_string()))?;

        self.dispatcher.maybe_alert_with_snapshot(
            &pass.detections,
            AlertSource::StillImage,
            jpeg.clone(),
        );

        info!(
            width = frame.width,
            height = frame.height,
            detections = pass.detections.len(),
            "image processed"
        );

        Ok(ImageOutcome {
            jpeg,
            detections: pass.detections,
        })
    }
}
