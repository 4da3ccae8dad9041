//! Local-variance texture detection.
//!
//! Slides a window over the luminance plane, computes per-window variance
//! from integral images, and keeps the windows in the top decile. Adjacent
//! flagged windows fuse into one candidate region. A page with uniform
//! variance produces no candidates: the strict percentile cut means no
//! window exceeds the threshold when all windows are equal.

use super::CandidateDetector;
use crate::raster::{mask_blobs, percentile, sliding_windows, to_gray, windows_to_mask, LumaIntegral};
use image::RgbImage;
use serde_json::json;
use vizscout_core::{DetectionConfig, DetectionMethod, Region, Result};

/// Sliding-window variance strategy.
pub struct TextureDetector;

impl CandidateDetector for TextureDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Texture
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
        let stats = sliding_windows(width, height, config.texture_window, |bbox| {
            integral.variance(bbox)
        });
        if stats.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<f64> = stats.iter().map(|s| s.value).collect();
        let Some(cut) = percentile(&values, config.texture_percentile) else {
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
        let (min_area, max_area) = config.texture_area;
        let mut regions = Vec::new();

        for blob in mask_blobs(&mask) {
            if blob.pixels < min_area || blob.pixels > max_area {
                continue;
            }
            regions.push(
                Region::new(page_index, blob.bbox, DetectionMethod::Texture)
                    .with_metadata("texture_variance", json!(integral.variance(&blob.bbox))),
            );
        }

        Ok(regions)
    }
}
