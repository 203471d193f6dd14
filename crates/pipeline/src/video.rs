//! Whole-file video processing.

use std::path::Path;

use detector::has_fire;
use tracing::info;

use crate::process::run_frame_pass;
use crate::{Pipeline, PipelineError};

/// Result of processing one video file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoOutcome {
    /// Frames read from the input.
    pub frames: u64,
    /// Frames carrying at least one fire detection.
    pub hazard_frames: u64,
}

impl Pipeline {
    /// Processes a video file frame by frame.
    ///
    /// Every frame runs the shared pass and is written to `output` at the
    /// input's resolution and frame rate. No per-frame alerting happens
    /// here; if any frame contained fire, exactly one aggregated alert is
    /// dispatched after the whole file is done.
    pub fn process_video(&self, input: &Path, output: &Path) -> Result<VideoOutcome, PipelineError> {
        let (mut reader, info) = self
            .video
            .open_reader(input)
            .map_err(|e| PipelineError::Open(e.to_string()))?;

        if !self.model.is_available() {
            return Err(PipelineError::ModelUnavailable);
        }

        let mut writer = self.video.open_writer(output, &info)?;

        let mut frames = 0u64;
        let mut hazard_frames = 0u64;

        while let Some(frame) = reader.next_frame()? {
            let pass = run_frame_pass(&frame, self.model.as_ref(), &self.labels, &self.config);
            if has_fire(&pass.detections) {
                hazard_frames += 1;
            }
            writer.write_frame(&pass.frame)?;
            frames += 1;
        }
        writer.finish()?;

        if hazard_frames > 0 {
            self.dispatcher.alert_video_summary(hazard_frames, frames);
        }

        info!(
            input = %input.display(),
            frames,
            hazard_frames,
            "video processed"
        );

        Ok(VideoOutcome {
            frames,
            hazard_frames,
        })
    }
}
