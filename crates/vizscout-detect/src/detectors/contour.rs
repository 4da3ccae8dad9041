//! Multi-threshold contour detection.
//!
//! Binarizes the raster at three thresholds to stay robust against varying
//! contrast, extracts contours from each binary image, and keeps contours
//! whose bounding box passes the area and aspect-ratio bands. The same mark
//! typically appears at more than one threshold; the clusterer merges those
//! duplicates downstream.

use super::CandidateDetector;
use crate::raster::{mask_below, mask_blobs, to_gray};
use image::RgbImage;
use serde_json::json;
use vizscout_core::{DetectionConfig, DetectionMethod, Region, Result};

/// Triple-threshold binarization strategy.
pub struct ContourDetector;

impl CandidateDetector for ContourDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Contour
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
        let (min_area, max_area) = config.contour_area;
        let (min_aspect, max_aspect) = config.contour_aspect;
        let mut regions = Vec::new();

        for &thresh in &config.contour_thresholds {
            let mask = mask_below(&gray, thresh);
            for blob in mask_blobs(&mask) {
                if blob.pixels < min_area || blob.pixels > max_area {
                    continue;
                }
                let aspect = blob.bbox.aspect_ratio();
                if aspect < min_aspect || aspect > max_aspect {
                    continue;
                }
                regions.push(
                    Region::new(page_index, blob.bbox, DetectionMethod::Contour)
                        .with_metadata("threshold_used", json!(thresh)),
                );
            }
        }

        Ok(regions)
    }
}
