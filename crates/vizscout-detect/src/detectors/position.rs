//! Layout-slot position priors.
//!
//! Emits a small fixed set of large "slot" regions covering the canonical
//! layout zones where logos and hero graphics usually live. These are
//! priors, not measured detections: they always carry zero confidence until
//! the scorer weighs them, and the scorer gives the center and top-right
//! slots the largest positional bonus.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use super::CandidateDetector;
use image::RgbImage;
use serde_json::json;
use vizscout_core::{DetectionConfig, DetectionMethod, PixelBox, Region, Result};

/// Canonical layout slots as page fractions `(name, x0, y0, x1, y1)`.
const SLOTS: &[(&str, f64, f64, f64, f64)] = &[
    ("top_left", 0.02, 0.02, 0.30, 0.18),
    ("top_center", 0.35, 0.02, 0.65, 0.18),
    ("top_right", 0.70, 0.02, 0.98, 0.18),
    ("center", 0.30, 0.35, 0.70, 0.65),
    ("bottom", 0.25, 0.82, 0.75, 0.98),
];

/// Fixed layout-slot prior strategy.
pub struct PositionDetector;

impl CandidateDetector for PositionDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Position
    }

    fn detect(
        &self,
        image: &RgbImage,
        page_index: usize,
        _config: &DetectionConfig,
    ) -> Result<Vec<Region>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let regions = SLOTS
            .iter()
            .map(|&(name, fx0, fy0, fx1, fy1)| {
                let bbox = PixelBox::new(
                    (fx0 * f64::from(width)) as u32,
                    (fy0 * f64::from(height)) as u32,
                    (fx1 * f64::from(width)) as u32,
                    (fy1 * f64::from(height)) as u32,
                )
                .clamp_to(width, height);
                Region::new(page_index, bbox, DetectionMethod::Position)
                    .with_metadata("slot", json!(name))
            })
            .collect();

        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_emits_the_five_slots() {
        let image = RgbImage::from_pixel(1000, 1000, Rgb([255, 255, 255]));
        let regions = PositionDetector
            .detect(&image, 0, &DetectionConfig::default())
            .unwrap();
        assert_eq!(regions.len(), 5);

        let slots: Vec<&str> = regions
            .iter()
            .filter_map(|r| r.metadata_str("slot"))
            .collect();
        assert_eq!(
            slots,
            vec!["top_left", "top_center", "top_right", "center", "bottom"]
        );
        // Priors are unscored until the region scorer runs.
        assert!(regions.iter().all(|r| r.confidence == 0.0));
    }

    #[test]
    fn test_slots_scale_with_page_size() {
        let image = RgbImage::from_pixel(500, 2000, Rgb([255, 255, 255]));
        let regions = PositionDetector
            .detect(&image, 0, &DetectionConfig::default())
            .unwrap();
        let center = regions
            .iter()
            .find(|r| r.metadata_str("slot") == Some("center"))
            .unwrap();
        assert_eq!(center.bbox, PixelBox::new(150, 700, 350, 1300));
    }

    #[test]
    fn test_degenerate_raster_emits_nothing() {
        let image = RgbImage::new(0, 0);
        let regions = PositionDetector
            .detect(&image, 0, &DetectionConfig::default())
            .unwrap();
        assert!(regions.is_empty());
    }
}
