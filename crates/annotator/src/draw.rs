//! Box, label, and status rendering.

use camera_capture::Frame;
use detector::CanonicalDetection;
use detector::{FIRE_LABEL, SMOKE_LABEL};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::font;
use crate::AnnotatorError;

const FIRE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const SMOKE_COLOR: Rgb<u8> = Rgb([255, 165, 0]);
const DEFAULT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LABEL_BG: Rgb<u8> = Rgb([0, 0, 0]);
const COUNT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Draws detections and the status overlay onto a copy of `frame`.
///
/// Fire boxes are red, smoke boxes orange, anything else green, each with
/// a `<label> NN%` tag above it. The top-left corner carries the status
/// line and a detection count. Timestamp and sequence carry over from the
/// input frame. A frame whose buffer does not match its dimensions is
/// returned as an unannotated copy.
pub fn annotate(frame: &Frame, detections: &[CanonicalDetection]) -> Frame {
    let Some(mut image) = frame.to_rgb_image() else {
        return frame.clone();
    };

    for detection in detections {
        draw_detection(&mut image, detection);
    }
    draw_status(&mut image, detections);

    let mut annotated = frame.clone();
    annotated.data = image.into_raw();
    annotated
}

/// The status line for a set of detections: `FIRE!` beats `SMOKE` beats
/// `Clear`.
pub fn status_line(detections: &[CanonicalDetection]) -> &'static str {
    status(detections).0
}

/// Encodes a frame as JPEG at the given quality (clamped to 1..=100).
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>, AnnotatorError> {
    let image = frame.to_rgb_image().ok_or(AnnotatorError::InvalidFrame {
        width: frame.width,
        height: frame.height,
    })?;

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode_image(&image)
        .map_err(|e| AnnotatorError::Encode(e.to_string()))?;
    Ok(buffer)
}

fn status(detections: &[CanonicalDetection]) -> (&'static str, Rgb<u8>) {
    if detections.iter().any(CanonicalDetection::is_fire) {
        ("FIRE!", FIRE_COLOR)
    } else if detections.iter().any(CanonicalDetection::is_smoke) {
        ("SMOKE", SMOKE_COLOR)
    } else {
        ("Clear", DEFAULT_COLOR)
    }
}

fn class_color(label: &str) -> Rgb<u8> {
    match label {
        FIRE_LABEL => FIRE_COLOR,
        SMOKE_LABEL => SMOKE_COLOR,
        _ => DEFAULT_COLOR,
    }
}

fn draw_detection(image: &mut RgbImage, detection: &CanonicalDetection) {
    let color = class_color(&detection.label);
    let bbox = detection
        .bbox
        .clamp_to(image.width() as f32, image.height() as f32);
    let x = bbox.x1.round() as i32;
    let y = bbox.y1.round() as i32;
    let w = bbox.width().round() as u32;
    let h = bbox.height().round() as u32;
    if w < 2 || h < 2 {
        return;
    }

    // Two nested hollow rects give a 2px border.
    draw_hollow_rect_mut(image, Rect::at(x, y).of_size(w, h), color);
    if w > 2 && h > 2 {
        draw_hollow_rect_mut(image, Rect::at(x + 1, y + 1).of_size(w - 2, h - 2), color);
    }

    let label = format!("{} {:.0}%", detection.label, detection.confidence * 100.0);
    let label_w = font::text_width(&label, 1);
    let label_y = (y - 12).max(0);
    draw_filled_rect_mut(
        image,
        Rect::at(x, label_y).of_size(label_w + 4, font::line_height(1) + 2),
        LABEL_BG,
    );
    font::draw_text(image, x + 2, label_y + 1, &label, 1, color);
}

fn draw_status(image: &mut RgbImage, detections: &[CanonicalDetection]) {
    let (text, color) = status(detections);
    font::draw_text(image, 10, 10, text, 2, color);

    let count = format!("Detections: {}", detections.len());
    font::draw_text(image, 10, 30, &count, 1, COUNT_COLOR);
}
