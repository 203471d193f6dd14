//! Shared test doubles for the pipeline crate.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use alerting::{AlertError, AlertMessage, AlertTransport};
use camera_capture::{CaptureError, Frame, FrameSource};
use detector::{BoundingBox, DetectorError, HazardModel, InferenceParams, RawDetection};
use video_io::{FrameRead, FrameWrite, VideoError, VideoInfo, VideoIo};

/// An RGB frame filled with the value 100 everywhere.
pub(crate) fn test_frame(width: u32, height: u32) -> Frame {
    Frame::new(vec![100; (width * height * 3) as usize], width, height, 0, 0)
}

/// A fire detection large enough to clear the default area filter.
pub(crate) fn fire_raw(confidence: f32) -> RawDetection {
    RawDetection {
        class_id: 1,
        model_label: Some("fire".to_string()),
        confidence,
        bbox: BoundingBox::new(10.0, 10.0, 50.0, 50.0),
    }
}

/// A smoke detection large enough to clear the default area filter.
pub(crate) fn smoke_raw(confidence: f32) -> RawDetection {
    RawDetection {
        class_id: 0,
        model_label: Some("smoke".to_string()),
        confidence,
        bbox: BoundingBox::new(5.0, 5.0, 60.0, 45.0),
    }
}

/// A model that replays a script of inference results.
///
/// Each call pops the next scripted result; once the script runs out every
/// call returns zero detections. Frames handed to `infer` are recorded.
pub(crate) struct ScriptedModel {
    script: Mutex<VecDeque<Result<Vec<RawDetection>, DetectorError>>>,
    seen: Mutex<Vec<Frame>>,
    available: bool,
}

impl ScriptedModel {
    /// An available model that always reports zero detections.
    pub(crate) fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub(crate) fn with_script(script: Vec<Result<Vec<RawDetection>, DetectorError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
            available: true,
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Frames observed by `infer`, in call order.
    pub(crate) fn seen(&self) -> Vec<Frame> {
        self.seen.lock().unwrap().clone()
    }
}

impl HazardModel for ScriptedModel {
    fn infer(
        &self,
        frame: &Frame,
        _params: &InferenceParams,
    ) -> Result<Vec<RawDetection>, DetectorError> {
        self.seen.lock().unwrap().push(frame.clone());
        if !self.available {
            return Err(DetectorError::Unavailable);
        }
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(Vec::new()),
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

/// A transport that records every delivered message.
#[derive(Clone)]
pub(crate) struct RecordingTransport {
    sent: Arc<Mutex<Vec<AlertMessage>>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl AlertTransport for RecordingTransport {
    fn is_configured(&self) -> bool {
        true
    }

    fn send(
        &self,
        message: AlertMessage,
    ) -> impl std::future::Future<Output = Result<(), AlertError>> + Send {
        let sent = self.sent.clone();
        async move {
            sent.lock().unwrap().push(message);
            Ok(())
        }
    }
}

/// Waits until the recording transport has seen `count` messages.
pub(crate) async fn wait_for_sent(transport: &RecordingTransport, count: usize) {
    for _ in 0..200 {
        if transport.sent().len() >= count {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!(
        "transport saw {} messages, wanted {count}",
        transport.sent().len()
    );
}

/// Assembles a pipeline over the given doubles with default settings.
///
/// Spawns the alert worker, so callers need a tokio runtime.
pub(crate) fn build_pipeline(
    model: ScriptedModel,
    transport: RecordingTransport,
    video: FakeVideoIo,
) -> crate::Pipeline {
    crate::Pipeline::new(
        Arc::new(model),
        Arc::new(alerting::AlertDispatcher::spawn(
            transport,
            alerting::AlertConfig::default(),
        )),
        Arc::new(video),
        crate::PipelineConfig::default(),
    )
}

/// A frame source backed by a queue of prepared frames.
pub(crate) struct FakeSource {
    frames: VecDeque<Result<Option<Frame>, CaptureError>>,
    closed: Arc<AtomicBool>,
}

impl FakeSource {
    /// A source yielding `count` frames of the given size, then end of
    /// stream. The returned flag flips once the session releases the
    /// source.
    pub(crate) fn with_frames(count: usize, width: u32, height: u32) -> (Self, Arc<AtomicBool>) {
        let frames = (0..count)
            .map(|i| {
                Ok(Some(Frame::new(
                    vec![100; (width * height * 3) as usize],
                    width,
                    height,
                    i as u64 * 33_000_000,
                    i as u64,
                )))
            })
            .collect();
        let closed = Arc::new(AtomicBool::new(false));
        (
            Self {
                frames,
                closed: closed.clone(),
            },
            closed,
        )
    }

    /// A source that yields one frame and then fails.
    pub(crate) fn failing_after_one() -> (Self, Arc<AtomicBool>) {
        let (mut source, closed) = Self::with_frames(1, 8, 8);
        source
            .frames
            .push_back(Err(CaptureError::Stream("device vanished".to_string())));
        (source, closed)
    }
}

impl FrameSource for FakeSource {
    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        match self.frames.pop_front() {
            Some(next) => next,
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// In-memory stand-in for the ffmpeg-backed video seam.
///
/// Clones share the written-frame log, so tests can keep a handle after
/// handing the fake to the pipeline.
#[derive(Clone)]
pub(crate) struct FakeVideoIo {
    frames: Vec<Frame>,
    info: VideoInfo,
    written: Arc<Mutex<Vec<Frame>>>,
    finished: Arc<AtomicBool>,
    fail_open: bool,
}

impl FakeVideoIo {
    pub(crate) fn with_frames(count: usize, width: u32, height: u32) -> Self {
        let frames = (0..count)
            .map(|i| {
                Frame::new(
                    vec![100; (width * height * 3) as usize],
                    width,
                    height,
                    i as u64 * 33_000_000,
                    i as u64,
                )
            })
            .collect();
        Self {
            frames,
            info: VideoInfo {
                width,
                height,
                fps: 30.0,
                duration: count as f64 / 30.0,
                codec: "h264".to_string(),
            },
            written: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::new(AtomicBool::new(false)),
            fail_open: false,
        }
    }

    pub(crate) fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::with_frames(0, 8, 8)
        }
    }

    pub(crate) fn written(&self) -> Vec<Frame> {
        self.written.lock().unwrap().clone()
    }

    pub(crate) fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl VideoIo for FakeVideoIo {
    fn open_reader(&self, path: &Path) -> Result<(Box<dyn FrameRead>, VideoInfo), VideoError> {
        if self.fail_open {
            return Err(VideoError::Open {
                path: path.display().to_string(),
                detail: "scripted open failure".to_string(),
            });
        }
        Ok((
            Box::new(VecReader {
                frames: self.frames.clone().into(),
            }),
            self.info.clone(),
        ))
    }

    fn open_writer(
        &self,
        _path: &Path,
        _info: &VideoInfo,
    ) -> Result<Box<dyn FrameWrite>, VideoError> {
        Ok(Box::new(VecWriter {
            written: self.written.clone(),
            finished: self.finished.clone(),
        }))
    }
}

struct VecReader {
    frames: VecDeque<Frame>,
}

impl FrameRead for VecReader {
    fn next_frame(&mut self) -> Result<Option<Frame>, VideoError> {
        Ok(self.frames.pop_front())
    }
}

struct VecWriter {
    written: Arc<Mutex<Vec<Frame>>>,
    finished: Arc<AtomicBool>,
}

impl FrameWrite for VecWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        self.written.lock().unwrap().push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        self.finished.store(true, Ordering::SeqCst);
        Ok(())
    }
}
