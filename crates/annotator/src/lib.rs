//! Detection overlay rendering.
//!
//! Draws bounding boxes, per-detection labels, and a status line onto RGB
//! frames, and encodes frames as JPEG for delivery. Rendering is pure:
//! the same frame and detections always produce the same output.

pub mod draw;
mod font;

pub use draw::{annotate, encode_jpeg, status_line};

use thiserror::Error;

/// Errors produced while encoding annotated frames.
#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("frame buffer does not match {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },

    #[error("jpeg encoding failed: {0}")]
    Encode(String),
}
