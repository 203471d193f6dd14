//! Detection types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Canonical label for fire detections. Alerting keys off this value.
pub const FIRE_LABEL: &str = "Fire";

/// Canonical label for smoke detections.
pub const SMOKE_LABEL: &str = "Smoke";

/// Axis-aligned bounding box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection-over-union with another box. Zero when disjoint.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let iw = (ix2 - ix1).max(0.0);
        let ih = (iy2 - iy1).max(0.0);
        let intersection = iw * ih;

        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }

    /// Clamps all corners into `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: f32, height: f32) -> BoundingBox {
        BoundingBox {
            x1: self.x1.clamp(0.0, width),
            y1: self.y1.clamp(0.0, height),
            x2: self.x2.clamp(0.0, width),
            y2: self.y2.clamp(0.0, height),
        }
    }
}

/// A detection as reported by the model, before label resolution and
/// area filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Class index in the model's output order.
    pub class_id: u32,
    /// Class name the model metadata reports, when it has one.
    pub model_label: Option<String>,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// A detection that survived filtering, with its resolved label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDetection {
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    /// Bounding-box area in source pixels, cached at filter time.
    pub area: f32,
}

impl CanonicalDetection {
    pub fn is_fire(&self) -> bool {
        self.label == FIRE_LABEL
    }

    pub fn is_smoke(&self) -> bool {
        self.label == SMOKE_LABEL
    }
}

/// True when any detection in the slice carries the fire label.
pub fn has_fire(detections: &[CanonicalDetection]) -> bool {
    detections.iter().any(CanonicalDetection::is_fire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_of_degenerate_box_is_zero() {
        let bbox = BoundingBox::new(50.0, 50.0, 10.0, 10.0);
        assert_eq!(bbox.width(), 0.0);
        assert_eq!(bbox.area(), 0.0);
    }

    #[test]
    fn test_iou_of_identical_boxes_is_one() {
        let bbox = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
        assert!((bbox.iou(&bbox) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_of_disjoint_boxes_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_of_half_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(0.0, 5.0, 10.0, 15.0);
        // intersection 50, union 150
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_keeps_box_inside_image() {
        let bbox = BoundingBox::new(-5.0, -5.0, 700.0, 500.0);
        let clamped = bbox.clamp_to(640.0, 480.0);
        assert_eq!(clamped.x1, 0.0);
        assert_eq!(clamped.y1, 0.0);
        assert_eq!(clamped.x2, 640.0);
        assert_eq!(clamped.y2, 480.0);
    }

    #[test]
    fn test_has_fire_matches_label_exactly() {
        let fire = CanonicalDetection {
            label: FIRE_LABEL.to_string(),
            confidence: 0.9,
            bbox: BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            area: 10000.0,
        };
        let smoke = CanonicalDetection {
            label: SMOKE_LABEL.to_string(),
            ..fire.clone()
        };
        assert!(has_fire(&[smoke.clone(), fire]));
        assert!(!has_fire(&[smoke]));
        assert!(!has_fire(&[]));
    }
}
