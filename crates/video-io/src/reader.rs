//! Frame-by-frame video decode.

use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use camera_capture::Frame;
use tracing::{debug, warn};

use crate::probe::VideoInfo;
use crate::{FrameRead, VideoError};

pub(crate) fn decode_args(path: &Path) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        path.display().to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-".to_string(),
    ]
}

/// Reads RGB frames from an ffmpeg decode pipe.
///
/// Frames carry a synthetic timestamp derived from the stream's frame
/// rate, so downstream code sees monotonic media time.
pub struct FfmpegReader {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    frame_interval_ns: u64,
    sequence: u64,
    done: bool,
}

impl FfmpegReader {
    pub(crate) fn open(path: &Path, info: &VideoInfo) -> Result<Self, VideoError> {
        let mut child = Command::new("ffmpeg")
            .args(decode_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| VideoError::Open {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;
        let stdout = child.stdout.take().ok_or_else(|| VideoError::Open {
            path: path.display().to_string(),
            detail: "ffmpeg gave no stdout pipe".to_string(),
        })?;

        let frame_interval_ns = if info.fps > 0.0 {
            (1_000_000_000f64 / info.fps) as u64
        } else {
            0
        };

        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            "opened video for decode"
        );
        Ok(Self {
            child,
            stdout,
            width: info.width,
            height: info.height,
            frame_interval_ns,
            sequence: 0,
            done: false,
        })
    }
}

impl FrameRead for FfmpegReader {
    fn next_frame(&mut self) -> Result<Option<Frame>, VideoError> {
        if self.done {
            return Ok(None);
        }

        let mut buffer = vec![0u8; (self.width * self.height * 3) as usize];
        match self.stdout.read_exact(&mut buffer) {
            Ok(()) => {
                let timestamp_ns = self.sequence * self.frame_interval_ns;
                let frame =
                    Frame::new(buffer, self.width, self.height, timestamp_ns, self.sequence);
                self.sequence += 1;
                Ok(Some(frame))
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.done = true;
                if let Err(e) = self.child.wait() {
                    warn!("ffmpeg decode wait failed: {e}");
                }
                debug!(frames = self.sequence, "video decode finished");
                Ok(None)
            }
            Err(e) => Err(VideoError::Io(e)),
        }
    }
}

impl Drop for FfmpegReader {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_args_pipe_rawvideo_to_stdout() {
        let args = decode_args(Path::new("clips/input.mp4"));

        let input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input + 1], "clips/input.mp4");

        let format = args.iter().position(|a| a == "-f").unwrap();
        assert!(format > input);
        assert_eq!(args[format + 1], "rawvideo");
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }
}
