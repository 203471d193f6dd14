//! Pipeline configuration.

use alerting::AlertConfig;
use camera_capture::CaptureConfig;
use detector::DetectorConfig;
use serde::{Deserialize, Serialize};

/// Brightness/contrast adjustment applied to every frame before inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Multiplicative gain per channel.
    pub gain: f32,
    /// Additive offset per channel, applied after the gain.
    pub offset: f32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            gain: 1.2,
            offset: 10.0,
        }
    }
}

/// Top-level configuration for the hazard pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub capture: CaptureConfig,
    pub enhance: EnhanceConfig,
    pub detector: DetectorConfig,
    pub alert: AlertConfig,
    /// JPEG quality for annotated outputs (1-100).
    pub jpeg_quality: u8,
    /// Bounded chunk buffer between the stream producer and consumer.
    pub stream_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            enhance: EnhanceConfig::default(),
            detector: DetectorConfig::default(),
            alert: AlertConfig::default(),
            jpeg_quality: 95,
            stream_buffer: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enhance_parameters() {
        let config = EnhanceConfig::default();
        assert!((config.gain - 1.2).abs() < f32::EPSILON);
        assert!((config.offset - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"enhance": {"gain": 2.0}, "jpeg_quality": 80}"#)
                .unwrap();
        assert!((config.enhance.gain - 2.0).abs() < f32::EPSILON);
        assert!((config.enhance.offset - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.stream_buffer, 4);
        assert!((config.detector.confidence_threshold - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_round_trip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.jpeg_quality, config.jpeg_quality);
        assert_eq!(back.capture.device, config.capture.device);
        assert_eq!(back.alert.cooldown_seconds, config.alert.cooldown_seconds);
    }
}
