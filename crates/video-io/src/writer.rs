//! Frame-by-frame video encode.

use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use camera_capture::Frame;
use tracing::debug;

use crate::probe::VideoInfo;
use crate::{FrameWrite, VideoError};

pub(crate) fn encode_args(path: &Path, info: &VideoInfo) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-s".to_string(),
        format!("{}x{}", info.width, info.height),
        "-r".to_string(),
        format!("{}", info.fps),
        "-i".to_string(),
        "-".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        path.display().to_string(),
    ]
}

/// Writes RGB frames into an ffmpeg encode pipe.
///
/// The output keeps the source resolution and frame rate. [`finish`]
/// closes the pipe and waits for the encoder to finalize the container;
/// dropping an unfinished writer kills the encoder instead.
///
/// [`finish`]: FrameWrite::finish
pub struct FfmpegWriter {
    child: Child,
    stdin: Option<ChildStdin>,
    expected_len: usize,
    frames: u64,
    finished: bool,
}

impl FfmpegWriter {
    pub(crate) fn open(path: &Path, info: &VideoInfo) -> Result<Self, VideoError> {
        let mut child = Command::new("ffmpeg")
            .args(encode_args(path, info))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| VideoError::Write(e.to_string()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VideoError::Write("ffmpeg gave no stdin pipe".to_string()))?;

        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            "opened video for encode"
        );
        Ok(Self {
            child,
            stdin: Some(stdin),
            expected_len: (info.width * info.height * 3) as usize,
            frames: 0,
            finished: false,
        })
    }
}

impl FrameWrite for FfmpegWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| VideoError::Write("writer already finished".to_string()))?;
        if frame.data.len() != self.expected_len {
            return Err(VideoError::Write(format!(
                "frame holds {} bytes, expected {}",
                frame.data.len(),
                self.expected_len
            )));
        }

        stdin.write_all(&frame.data)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        drop(self.stdin.take());

        let status = self.child.wait()?;
        if !status.success() {
            return Err(VideoError::Write(format!("ffmpeg exited with {status}")));
        }
        debug!(frames = self.frames, "video encode finished");
        Ok(())
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if !self.finished {
            drop(self.stdin.take());
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_args_preserve_resolution_and_fps() {
        let info = VideoInfo {
            width: 1280,
            height: 720,
            fps: 30.0,
            duration: 0.0,
            codec: "h264".to_string(),
        };
        let args = encode_args(Path::new("out/processed.mp4"), &info);

        let size = args.iter().position(|a| a == "-s").unwrap();
        assert_eq!(args[size + 1], "1280x720");

        let rate = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[rate + 1], "30");

        let codec = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(args[codec + 1], "libx264");
        assert_eq!(args.last().map(String::as_str), Some("out/processed.mp4"));
    }

    #[test]
    fn test_encode_args_read_raw_frames_from_stdin() {
        let info = VideoInfo {
            width: 64,
            height: 48,
            fps: 29.97,
            duration: 0.0,
            codec: String::new(),
        };
        let args = encode_args(Path::new("out.mp4"), &info);

        let input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input + 1], "-");

        // Raw input options must precede -i, output options follow it.
        let rawvideo = args.iter().position(|a| a == "rawvideo").unwrap();
        let x264 = args.iter().position(|a| a == "libx264").unwrap();
        assert!(rawvideo < input);
        assert!(x264 > input);

        let rate = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[rate + 1], "29.97");
    }
}
