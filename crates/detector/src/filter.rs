//! Post-inference detection filtering.

use tracing::debug;

use crate::detection::{CanonicalDetection, RawDetection};
use crate::labels::ClassLabelMap;

/// Filters raw detections down to the canonical set the pipeline acts on.
///
/// Each raw detection passes through two steps, in order:
///
/// 1. Area gate: boxes with `area < min_area` are discarded.
/// 2. Label resolution: the label map wins when it has an entry for the
///    class id, otherwise the model-reported name is used, otherwise a
///    `class <id>` placeholder.
///
/// Input order is preserved for the detections that survive.
pub fn filter_detections(
    raw: &[RawDetection],
    min_area: f32,
    labels: &ClassLabelMap,
) -> Vec<CanonicalDetection> {
    let mut kept = Vec::with_capacity(raw.len());

    for detection in raw {
        let area = detection.bbox.area();
        if area < min_area {
            debug!(
                class_id = detection.class_id,
                area, min_area, "dropping detection below area threshold"
            );
            continue;
        }

        let label = resolve_label(detection, labels);
        kept.push(CanonicalDetection {
            label,
            confidence: detection.confidence,
            bbox: detection.bbox,
            area,
        });
    }

    kept
}

fn resolve_label(detection: &RawDetection, labels: &ClassLabelMap) -> String {
    if let Some(canonical) = labels.canonical(detection.class_id) {
        return canonical.to_string();
    }
    if let Some(name) = &detection.model_label {
        return name.clone();
    }
    format!("class {}", detection.class_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{BoundingBox, FIRE_LABEL, SMOKE_LABEL};

    fn raw(class_id: u32, confidence: f32, bbox: BoundingBox) -> RawDetection {
        RawDetection {
            class_id,
            model_label: None,
            confidence,
            bbox,
        }
    }

    #[test]
    fn test_maps_class_id_and_keeps_large_box() {
        let detections = vec![raw(1, 0.9, BoundingBox::new(10.0, 10.0, 50.0, 50.0))];
        let labels = ClassLabelMap::hazard_default();

        let kept = filter_detections(&detections, 1000.0, &labels);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label, FIRE_LABEL);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[0].bbox, BoundingBox::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(kept[0].area, 1600.0);
    }

    #[test]
    fn test_drops_box_below_area_threshold() {
        let detections = vec![raw(1, 0.9, BoundingBox::new(10.0, 10.0, 15.0, 15.0))];
        let labels = ClassLabelMap::hazard_default();

        let kept = filter_detections(&detections, 1000.0, &labels);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_area_exactly_at_threshold_is_kept() {
        // 40 x 25 = 1000
        let detections = vec![raw(0, 0.5, BoundingBox::new(0.0, 0.0, 40.0, 25.0))];
        let labels = ClassLabelMap::hazard_default();

        let kept = filter_detections(&detections, 1000.0, &labels);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label, SMOKE_LABEL);
    }

    #[test]
    fn test_every_kept_detection_meets_area_threshold() {
        let labels = ClassLabelMap::hazard_default();
        let mut detections = Vec::new();
        for i in 0..50u32 {
            let side = i as f32 * 2.0;
            detections.push(raw(
                i % 2,
                0.5,
                BoundingBox::new(0.0, 0.0, side, side),
            ));
        }

        for min_area in [0.0, 500.0, 1000.0, 5000.0] {
            let kept = filter_detections(&detections, min_area, &labels);
            assert!(kept.iter().all(|d| d.area >= min_area));
            let expected = detections
                .iter()
                .filter(|d| d.bbox.area() >= min_area)
                .count();
            assert_eq!(kept.len(), expected);
        }
    }

    #[test]
    fn test_map_overrides_model_reported_name() {
        let detections = vec![RawDetection {
            class_id: 1,
            model_label: Some("smoke".to_string()),
            confidence: 0.8,
            bbox: BoundingBox::new(0.0, 0.0, 100.0, 100.0),
        }];
        let labels = ClassLabelMap::hazard_default();

        let kept = filter_detections(&detections, 1000.0, &labels);
        assert_eq!(kept[0].label, FIRE_LABEL);
    }

    #[test]
    fn test_unmapped_class_falls_back_to_model_name() {
        let detections = vec![RawDetection {
            class_id: 7,
            model_label: Some("person".to_string()),
            confidence: 0.8,
            bbox: BoundingBox::new(0.0, 0.0, 100.0, 100.0),
        }];
        let labels = ClassLabelMap::hazard_default();

        let kept = filter_detections(&detections, 1000.0, &labels);
        assert_eq!(kept[0].label, "person");
    }

    #[test]
    fn test_unmapped_unnamed_class_gets_placeholder() {
        let detections = vec![raw(9, 0.8, BoundingBox::new(0.0, 0.0, 100.0, 100.0))];
        let labels = ClassLabelMap::hazard_default();

        let kept = filter_detections(&detections, 1000.0, &labels);
        assert_eq!(kept[0].label, "class 9");
    }

    #[test]
    fn test_preserves_input_order() {
        let detections = vec![
            raw(1, 0.3, BoundingBox::new(0.0, 0.0, 100.0, 100.0)),
            raw(0, 0.9, BoundingBox::new(0.0, 0.0, 200.0, 200.0)),
            raw(1, 0.6, BoundingBox::new(0.0, 0.0, 150.0, 150.0)),
        ];
        let labels = ClassLabelMap::hazard_default();

        let kept = filter_detections(&detections, 0.0, &labels);
        let order: Vec<f32> = kept.iter().map(|d| d.confidence).collect();
        assert_eq!(order, vec![0.3, 0.9, 0.6]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let labels = ClassLabelMap::hazard_default();
        assert!(filter_detections(&[], 1000.0, &labels).is_empty());
    }
}
