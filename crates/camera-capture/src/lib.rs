//! Camera Capture Library for the Hazard Pipeline
//!
//! Provides live frame acquisition for the detection loop.
//! Supports:
//! - FFmpeg-backed webcam capture (V4L2 devices, 1280x720 default)
//! - A `FrameSource` seam so stream sessions can run against any producer

pub mod ffmpeg;
pub mod frame;

pub use ffmpeg::FfmpegCamera;
pub use frame::Frame;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to open capture device: {0}")]
    Open(String),

    #[error("Streaming error: {0}")]
    Stream(String),

    #[error("Capture timeout")]
    Timeout,

    #[error("Capture device not initialized")]
    NotInitialized,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Device path (e.g., "/dev/video0")
    pub device: String,
    /// Requested capture width (the device may ignore the hint; output
    /// frames are scaled to this size regardless)
    pub width: u32,
    /// Requested capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 1280,
            height: 720,
            fps: 30,
        }
    }
}

impl CaptureConfig {
    /// Create a webcam config for the live hazard feed
    pub fn webcam() -> Self {
        Self::default()
    }
}

/// A producer of frames for one stream session.
///
/// `read_frame` returning `Ok(None)` means the source is exhausted and the
/// session should terminate. Errors are treated the same way by the stream
/// loop; the distinction exists for logging.
pub trait FrameSource: Send {
    /// Read the next frame, blocking until one is available.
    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Release the underlying device. Also invoked on drop by
    /// implementations that hold OS resources.
    fn close(&mut self);
}
