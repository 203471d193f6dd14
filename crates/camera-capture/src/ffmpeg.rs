//! FFmpeg-backed webcam capture
//!
//! Spawns an FFmpeg process that decodes a V4L2 device and writes raw RGB24
//! frames to stdout; `read_frame` pulls them one `width * height * 3` chunk
//! at a time.

use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::{CaptureConfig, CaptureError, Frame, FrameSource};

/// Live camera source backed by an FFmpeg subprocess
pub struct FfmpegCamera {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    sequence: u64,
    closed: bool,
}

/// Build the FFmpeg argument list for a capture device.
///
/// The requested size is passed as an input hint and enforced with a scale
/// filter, so output frames have the configured dimensions even when the
/// device ignores the hint.
fn capture_args(config: &CaptureConfig) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "v4l2".into(),
        "-framerate".into(),
        config.fps.to_string(),
        "-video_size".into(),
        format!("{}x{}", config.width, config.height),
        "-i".into(),
        config.device.clone(),
        "-vf".into(),
        format!("scale={}:{}", config.width, config.height),
        "-pix_fmt".into(),
        "rgb24".into(),
        "-f".into(),
        "rawvideo".into(),
        "-".into(),
    ]
}

impl FfmpegCamera {
    /// Open the configured device.
    ///
    /// Fails synchronously when FFmpeg is missing or the process cannot be
    /// spawned; a device that exists but produces no frames surfaces as an
    /// exhausted source on the first read instead.
    pub fn open(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let mut child = Command::new("ffmpeg")
            .args(capture_args(config))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CaptureError::Open("ffmpeg not found in PATH".to_string())
                } else {
                    CaptureError::Open(format!("{}: {}", config.device, e))
                }
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptureError::Open("failed to attach to ffmpeg stdout".to_string()))?;

        info!(
            "Opened capture device {} at {}x{} @ {}fps",
            config.device, config.width, config.height, config.fps
        );

        Ok(Self {
            child,
            stdout,
            width: config.width,
            height: config.height,
            sequence: 0,
            closed: false,
        })
    }
}

impl FrameSource for FfmpegCamera {
    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.closed {
            return Ok(None);
        }

        let frame_bytes = (self.width * self.height * 3) as usize;
        let mut buffer = vec![0u8; frame_bytes];

        match self.stdout.read_exact(&mut buffer) {
            Ok(()) => {
                let timestamp_ns = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0);
                let frame = Frame::new(buffer, self.width, self.height, timestamp_ns, self.sequence);
                self.sequence += 1;
                Ok(Some(frame))
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("Capture pipe closed after {} frames", self.sequence);
                Ok(None)
            }
            Err(e) => Err(CaptureError::Stream(e.to_string())),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.child.kill();
            let _ = self.child.wait();
            debug!("Capture device released");
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.close();
    }
}
