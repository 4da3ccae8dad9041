//! Local-contrast detection.
//!
//! Same sliding-window machinery as the texture detector, but the statistic
//! is the local standard deviation of luminance and the cut keeps the top
//! 15% of windows. High local contrast marks crisp graphics and text; the
//! area band drops most body text blocks.

use super::CandidateDetector;
use crate::raster::{mask_blobs, percentile, sliding_windows, to_gray, windows_to_mask, LumaIntegral};
use image::RgbImage;
use serde_json::json;
use vizscout_core::{DetectionConfig, DetectionMethod, Region, Result};

/// Sliding-window contrast strategy.
pub struct BrightnessDetector;

impl CandidateDetector for BrightnessDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Brightness
    }

    fn detect(
        &self,
        image: &RgbImage,
        page_index: usize,
        config: &DetectionConfig,
    ) -> Result<Vec<Region>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let gray = to_gray(image);
        let integral = LumaIntegral::build(&gray);
        let stats = sliding_windows(width, height, config.brightness_window, |bbox| {
            integral.std_dev(bbox)
        });
        if stats.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<f64> = stats.iter().map(|s| s.value).collect();
        let Some(cut) = percentile(&values, config.brightness_percentile) else {
            return Ok(Vec::new());
        };

        let flagged: Vec<_> = stats
            .iter()
            .filter(|s| s.value > cut)
            .map(|s| s.bbox)
            .collect();
        if flagged.is_empty() {
            return Ok(Vec::new());
        }

        let mask = windows_to_mask(width, height, &flagged);
        let (min_area, max_area) = config.brightness_area;
        let mut regions = Vec::new();

        for blob in mask_blobs(&mask) {
            if blob.pixels < min_area || blob.pixels > max_area {
                continue;
            }
            regions.push(
                Region::new(page_index, blob.bbox, DetectionMethod::Brightness)
                    .with_metadata("contrast_level", json!(integral.std_dev(&blob.bbox))),
            );
        }

        Ok(regions)
    }
}
