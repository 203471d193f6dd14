//! Frame enhancement.
//!
//! Every frame is brightened before inference so dim scenes still carry
//! enough signal for the detector. The adjustment is a per-channel affine
//! map with saturating output.

use camera_capture::Frame;

use crate::config::EnhanceConfig;

/// Applies the configured gain and offset to every channel of a frame.
///
/// Each byte becomes `round(gain * value + offset)` clamped to `0..=255`.
/// Timing metadata is carried over unchanged.
pub fn enhance(frame: &Frame, config: &EnhanceConfig) -> Frame {
    let data = frame
        .data
        .iter()
        .map(|&value| {
            let adjusted = config.gain * f32::from(value) + config.offset;
            adjusted.round().clamp(0.0, 255.0) as u8
        })
        .collect();

    Frame::new(
        data,
        frame.width,
        frame.height,
        frame.timestamp_ns,
        frame.sequence,
    )
}
