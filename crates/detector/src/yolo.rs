//! YOLO-family ONNX inference.
//!
//! Runs a YOLOv8-style model through onnxruntime and decodes its
//! `[1, 4 + classes, anchors]` output into [`RawDetection`]s in source
//! pixel coordinates.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use camera_capture::Frame;
use image::imageops::FilterType;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, error, info, warn};

use crate::config::{DetectorConfig, InferenceParams};
use crate::detection::{BoundingBox, RawDetection};
use crate::model::HazardModel;
use crate::DetectorError;

/// ONNX-backed hazard detector.
///
/// Constructed without a model path it stays in a degraded state: it
/// reports unavailable and every inference call fails fast, while the
/// surrounding pipeline keeps serving frames.
#[derive(Debug)]
pub struct YoloDetector {
    session: Option<Mutex<Session>>,
    class_names: Vec<String>,
    deadline: Duration,
}

impl YoloDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self, DetectorError> {
        let session = match &config.model_path {
            Some(path) => Some(Mutex::new(load_session(path)?)),
            None => {
                warn!("no model path configured, running without detection");
                None
            }
        };

        Ok(Self {
            session,
            class_names: config.class_names.clone(),
            deadline: Duration::from_millis(config.infer_deadline_ms),
        })
    }
}

fn load_session(path: &str) -> Result<Session, DetectorError> {
    info!(path, "loading detection model");
    Session::builder()
        .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
        .and_then(|builder| builder.commit_from_file(path))
        .map_err(|e| {
            error!(path, error = %e, "model load failed");
            DetectorError::ModelLoad(e.to_string())
        })
}

impl HazardModel for YoloDetector {
    fn infer(
        &self,
        frame: &Frame,
        params: &InferenceParams,
    ) -> Result<Vec<RawDetection>, DetectorError> {
        let session = self.session.as_ref().ok_or(DetectorError::Unavailable)?;
        let started = Instant::now();

        let (input, scale_x, scale_y) = preprocess(frame, params.input_size)?;
        let shape = vec![
            1i64,
            3,
            params.input_size as i64,
            params.input_size as i64,
        ];
        let tensor = Tensor::from_array((shape, input.into_boxed_slice()))
            .map_err(|e| DetectorError::Inference(e.to_string()))?
            .into_dyn();

        let mut guard = session
            .lock()
            .map_err(|_| DetectorError::Inference("session lock poisoned".to_string()))?;
        let outputs = guard
            .run(ort::inputs!["images" => tensor])
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        let output = outputs
            .get("output0")
            .or_else(|| outputs.get("output"))
            .ok_or_else(|| {
                DetectorError::Inference("model produced no output0/output tensor".to_string())
            })?;
        let (out_shape, out_data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        let detections = parse_output(
            out_shape,
            out_data,
            params,
            scale_x,
            scale_y,
            frame.width as f32,
            frame.height as f32,
            &self.class_names,
        )?;
        let detections = nms(detections, params.iou_threshold);

        let elapsed = started.elapsed();
        if elapsed > self.deadline {
            return Err(DetectorError::Timeout {
                elapsed_ms: elapsed.as_millis() as u64,
                deadline_ms: self.deadline.as_millis() as u64,
            });
        }

        debug!(
            detections = detections.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "inference complete"
        );
        Ok(detections)
    }

    fn is_available(&self) -> bool {
        self.session.is_some()
    }
}

/// Resizes the frame to the model's square input and lays it out as
/// normalized NCHW floats. Returns the buffer plus the per-axis factors
/// that map model coordinates back to source pixels.
fn preprocess(frame: &Frame, input_size: u32) -> Result<(Vec<f32>, f32, f32), DetectorError> {
    let rgb = frame.to_rgb_image().ok_or_else(|| {
        DetectorError::ImageProcessing(format!(
            "frame buffer ({} bytes) does not match {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        ))
    })?;
    let resized = image::imageops::resize(&rgb, input_size, input_size, FilterType::Triangle);

    let side = input_size as usize;
    let plane = side * side;
    let mut data = vec![0.0f32; 3 * plane];
    for (x, y, pixel) in resized.enumerate_pixels() {
        let idx = y as usize * side + x as usize;
        data[idx] = pixel[0] as f32 / 255.0;
        data[plane + idx] = pixel[1] as f32 / 255.0;
        data[2 * plane + idx] = pixel[2] as f32 / 255.0;
    }

    let scale_x = frame.width as f32 / input_size as f32;
    let scale_y = frame.height as f32 / input_size as f32;
    Ok((data, scale_x, scale_y))
}

/// Decodes a `[1, 4 + classes, anchors]` output tensor.
///
/// Each anchor column holds `cx, cy, w, h` in model input coordinates
/// followed by per-class scores. The best-scoring class wins the anchor;
/// anchors below the confidence threshold are dropped. Boxes are scaled
/// back to source resolution and clamped to the image.
#[allow(clippy::too_many_arguments)]
pub(crate) fn parse_output(
    shape: &[i64],
    data: &[f32],
    params: &InferenceParams,
    scale_x: f32,
    scale_y: f32,
    source_width: f32,
    source_height: f32,
    class_names: &[String],
) -> Result<Vec<RawDetection>, DetectorError> {
    if shape.len() != 3 {
        return Err(DetectorError::Inference(format!(
            "unexpected output shape {shape:?}, want [1, features, anchors]"
        )));
    }
    let features = shape[1] as usize;
    let anchors = shape[2] as usize;
    if features < 5 {
        return Err(DetectorError::Inference(format!(
            "output has {features} features per anchor, want at least 5"
        )));
    }
    if data.len() < features * anchors {
        return Err(DetectorError::Inference(format!(
            "output tensor holds {} values, want {}",
            data.len(),
            features * anchors
        )));
    }
    let classes = features - 4;

    let mut detections = Vec::new();
    for i in 0..anchors {
        let mut best_class = 0usize;
        let mut best_score = 0.0f32;
        for c in 0..classes {
            let score = data[(4 + c) * anchors + i];
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }
        if best_score < params.confidence_threshold {
            continue;
        }

        let cx = data[i];
        let cy = data[anchors + i];
        let w = data[2 * anchors + i];
        let h = data[3 * anchors + i];

        let bbox = BoundingBox::new(
            (cx - w / 2.0) * scale_x,
            (cy - h / 2.0) * scale_y,
            (cx + w / 2.0) * scale_x,
            (cy + h / 2.0) * scale_y,
        )
        .clamp_to(source_width, source_height);

        detections.push(RawDetection {
            class_id: best_class as u32,
            model_label: class_names.get(best_class).cloned(),
            confidence: best_score,
            bbox,
        });
    }

    Ok(detections)
}

/// Greedy non-maximum suppression, applied per class.
pub(crate) fn nms(mut detections: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<RawDetection> = Vec::with_capacity(detections.len());
    for candidate in detections {
        let suppressed = kept.iter().any(|winner| {
            winner.class_id == candidate.class_id
                && winner.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
