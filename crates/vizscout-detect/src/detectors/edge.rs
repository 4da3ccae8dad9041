//! Edge-map contour detection.
//!
//! Computes canny edge maps at two sensitivity levels, unions them, and
//! emits one candidate per connected edge contour that passes the area band
//! and a minimum local edge-pixel density. The density filter drops large
//! sparse boxes that merely enclose scattered strokes.

#![allow(clippy::cast_precision_loss)]

use super::CandidateDetector;
use crate::raster::{count_foreground, mask_blobs, to_gray, union_masks};
use image::RgbImage;
use imageproc::edges::canny;
use serde_json::json;
use vizscout_core::{DetectionConfig, DetectionMethod, Region, Result};

/// Dual-threshold edge contour strategy.
pub struct EdgeDetector;

impl CandidateDetector for EdgeDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Edge
    }

    fn detect(
        &self,
        image: &RgbImage,
        page_index: usize,
        config: &DetectionConfig,
    ) -> Result<Vec<Region>> {
        let (width, height) = image.dimensions();
        if width < 3 || height < 3 {
            // canny needs a 3x3 neighborhood
            return Ok(Vec::new());
        }

        let gray = to_gray(image);
        let [(low_a, high_a), (low_b, high_b)] = config.edge_thresholds;
        let sensitive = canny(&gray, low_a, high_a);
        let conservative = canny(&gray, low_b, high_b);
        let edges = union_masks(&sensitive, &conservative);

        let (min_area, max_area) = config.edge_area;
        let mut regions = Vec::new();

        for blob in mask_blobs(&edges) {
            let area = blob.bbox.area();
            if area < min_area || area > max_area {
                continue;
            }
            let edge_pixels = count_foreground(&edges, &blob.bbox);
            let density = edge_pixels as f64 / area as f64;
            if density <= config.edge_min_density {
                continue;
            }
            regions.push(
                Region::new(page_index, blob.bbox, DetectionMethod::Edge)
                    .with_metadata("edge_density", json!(density)),
            );
        }

        Ok(regions)
    }
}
