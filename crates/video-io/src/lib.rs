//! Video file I/O over ffmpeg pipes.
//!
//! Decodes video files into RGB frames and encodes processed frames back
//! into a container, shelling out to `ffmpeg`/`ffprobe` the same way the
//! live capture path does. The [`VideoIo`] trait is the seam the pipeline
//! uses, so tests can substitute scripted readers and writers.

pub mod probe;
pub mod reader;
pub mod writer;

pub use probe::{probe_video, VideoInfo};
pub use reader::FfmpegReader;
pub use writer::FfmpegWriter;

use std::path::Path;

use camera_capture::Frame;
use thiserror::Error;

/// Video decode/encode errors.
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("failed to open video {path}: {detail}")]
    Open { path: String, detail: String },

    #[error("probe failed: {0}")]
    Probe(String),

    #[error("{0} not found in PATH")]
    MissingBinary(&'static str),

    #[error("failed to write video: {0}")]
    Write(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse probe output: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Pull-based frame source for a video file.
pub trait FrameRead: Send {
    /// The next decoded frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, VideoError>;
}

/// Sink for processed output frames.
pub trait FrameWrite: Send {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError>;

    /// Flushes pending frames and finalizes the container. Idempotent.
    fn finish(&mut self) -> Result<(), VideoError>;
}

/// Opens frame readers and writers for video files.
pub trait VideoIo: Send + Sync {
    /// Opens a file for decode, returning the reader and the probed
    /// stream metadata.
    fn open_reader(&self, path: &Path) -> Result<(Box<dyn FrameRead>, VideoInfo), VideoError>;

    /// Opens a file for encode at the given resolution and frame rate.
    fn open_writer(&self, path: &Path, info: &VideoInfo)
        -> Result<Box<dyn FrameWrite>, VideoError>;
}

/// ffmpeg-backed [`VideoIo`] implementation.
pub struct FfmpegVideo;

impl VideoIo for FfmpegVideo {
    fn open_reader(&self, path: &Path) -> Result<(Box<dyn FrameRead>, VideoInfo), VideoError> {
        let info = probe_video(path)?;
        which::which("ffmpeg").map_err(|_| VideoError::MissingBinary("ffmpeg"))?;
        let reader = FfmpegReader::open(path, &info)?;
        Ok((Box::new(reader), info))
    }

    fn open_writer(
        &self,
        path: &Path,
        info: &VideoInfo,
    ) -> Result<Box<dyn FrameWrite>, VideoError> {
        which::which("ffmpeg").map_err(|_| VideoError::MissingBinary("ffmpeg"))?;
        Ok(Box::new(FfmpegWriter::open(path, info)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `unwrap_err` below needs the `Ok` side of `open_reader` to be `Debug`.
    impl std::fmt::Debug for dyn FrameRead {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("dyn FrameRead")
        }
    }

    #[test]
    fn test_open_reader_on_missing_file_fails_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.mp4");

        let err = FfmpegVideo.open_reader(&path).unwrap_err();
        assert!(matches!(err, VideoError::Open { .. }));
    }
}
