//! Hazard pipeline orchestration.
//!
//! Ties the capture, detection, annotation, alerting, and video seams
//! together and exposes the three operating modes:
//! - **Stream**: live frames in, multipart JPEG chunks out, per-frame
//!   alerting ([`Pipeline::stream_session`])
//! - **Image**: one encoded image in, annotated JPEG and detections out
//!   ([`Pipeline::process_image`])
//! - **Video**: whole file in, annotated file out, one aggregated alert
//!   ([`Pipeline::process_video`])
//!
//! All three share the same per-frame pass: enhance, infer, filter by
//! area and label, annotate.

pub mod config;
pub mod enhance;
pub mod image;
pub mod process;
pub mod stream;
pub mod video;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{EnhanceConfig, PipelineConfig};
pub use process::FramePass;
pub use stream::{StreamSession, STREAM_CONTENT_TYPE};
pub use video::VideoOutcome;

pub use self::image::ImageOutcome;

use std::sync::Arc;

use alerting::{AlertDispatcher, TelegramConfig, TelegramTransport};
use camera_capture::{CaptureError, FfmpegCamera, FrameSource};
use detector::{ClassLabelMap, DetectorError, HazardModel, YoloDetector};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use video_io::{FfmpegVideo, VideoError, VideoIo};

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no detection model is available")]
    ModelUnavailable,

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to open video input: {0}")]
    Open(String),

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Video(#[from] VideoError),

    #[error("failed to encode output: {0}")]
    Encode(String),
}

/// The assembled hazard pipeline.
///
/// Holds the model, the alert dispatcher, and the video seam behind trait
/// objects so every mode can run against fakes in tests and against the
/// ONNX/Telegram/ffmpeg adapters in production.
pub struct Pipeline {
    model: Arc<dyn HazardModel>,
    dispatcher: Arc<AlertDispatcher>,
    video: Arc<dyn VideoIo>,
    labels: ClassLabelMap,
    config: PipelineConfig,
}

impl Pipeline {
    /// Assembles a pipeline from explicit seam implementations.
    pub fn new(
        model: Arc<dyn HazardModel>,
        dispatcher: Arc<AlertDispatcher>,
        video: Arc<dyn VideoIo>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            model,
            dispatcher,
            video,
            labels: ClassLabelMap::hazard_default(),
            config,
        }
    }

    /// Replaces the class-label map used to canonicalize detections.
    pub fn with_labels(mut self, labels: ClassLabelMap) -> Self {
        self.labels = labels;
        self
    }

    /// Wires the production adapters: ONNX detection, Telegram alerting
    /// with credentials from the environment, and ffmpeg-backed video
    /// files.
    ///
    /// Must be called inside a tokio runtime; the alert delivery worker
    /// is spawned here.
    pub fn from_config(config: PipelineConfig) -> Result<Self, PipelineError> {
        let model = YoloDetector::new(&config.detector)?;
        let transport = TelegramTransport::new(TelegramConfig::from_env());
        let dispatcher = AlertDispatcher::spawn(transport, config.alert.clone());

        Ok(Self::new(
            Arc::new(model),
            Arc::new(dispatcher),
            Arc::new(FfmpegVideo),
            config,
        ))
    }

    /// Opens the configured camera device as a stream source.
    pub fn open_camera(&self) -> Result<Box<dyn FrameSource>, PipelineError> {
        let camera = FfmpegCamera::open(&self.config.capture)?;
        Ok(Box::new(camera))
    }
}

/// Initialize logging/tracing for binaries embedding the pipeline.
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
