//! The six candidate detection strategies.
//!
//! Each strategy is a stateless function from a page raster to a list of
//! candidate [`Region`]s, tagged with detector-specific metadata. No single
//! cheap signal reliably separates graphics from text or white-space, so
//! six orthogonal strategies each trade precision for recall; the clusterer
//! and scorer downstream recover precision from their agreement.
//!
//! Strategies share no state and may run in any order or concurrently. The
//! fan-out in [`run_detectors`] preserves the fixed strategy order in its
//! output so the concatenated candidate list is deterministic regardless of
//! scheduling.

pub mod brightness;
pub mod color;
pub mod contour;
pub mod edge;
pub mod position;
pub mod texture;

use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, warn};
use vizscout_core::{DetectionConfig, DetectionMethod, Region, Result};

pub use brightness::BrightnessDetector;
pub use color::ColorDetector;
pub use contour::ContourDetector;
pub use edge::EdgeDetector;
pub use position::PositionDetector;
pub use texture::TextureDetector;

/// One independent candidate detection strategy.
pub trait CandidateDetector: Send + Sync {
    /// The method tag stamped on every region this strategy emits.
    fn method(&self) -> DetectionMethod;

    /// Scan a page raster for candidate regions.
    ///
    /// # Errors
    ///
    /// Returns an error if the raster is malformed for this strategy. The
    /// caller contains the failure; other strategies proceed.
    fn detect(
        &self,
        image: &RgbImage,
        page_index: usize,
        config: &DetectionConfig,
    ) -> Result<Vec<Region>>;
}

/// The full strategy set, in the fixed order their output is concatenated.
#[must_use = "returns the detector strategies"]
pub fn all_detectors() -> Vec<Box<dyn CandidateDetector>> {
    vec![
        Box::new(ColorDetector),
        Box::new(EdgeDetector),
        Box::new(ContourDetector),
        Box::new(TextureDetector),
        Box::new(PositionDetector),
        Box::new(BrightnessDetector),
    ]
}

/// Run every strategy against one page raster and concatenate the results.
///
/// Strategies run in parallel over the shared read-only raster. A failing
/// strategy contributes zero candidates and is logged; all other strategies
/// proceed. Output order is the fixed strategy order, then per-strategy
/// emission order, so repeated runs over the same raster yield the same
/// candidate list.
#[must_use = "returns the concatenated candidate list"]
pub fn run_detectors(
    image: &RgbImage,
    page_index: usize,
    config: &DetectionConfig,
) -> Vec<Region> {
    let detectors = all_detectors();

    let batches: Vec<Vec<Region>> = detectors
        .par_iter()
        .map(|detector| match detector.detect(image, page_index, config) {
            Ok(regions) => {
                debug!(
                    method = %detector.method(),
                    page_index,
                    candidates = regions.len(),
                    "detector finished"
                );
                regions
            }
            Err(e) => {
                warn!(
                    method = %detector.method(),
                    page_index,
                    "detector failed, contributing zero candidates: {e}"
                );
                Vec::new()
            }
        })
        .collect();

    batches.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_run_detectors_on_blank_page_yields_only_priors() {
        // Uniform white: no edges, no in-band color blobs (the page-sized
        // white blob exceeds the area cap), no texture variance. Only the
        // position priors remain.
        let image = RgbImage::from_pixel(800, 1000, Rgb([255, 255, 255]));
        let config = DetectionConfig::default();
        let candidates = run_detectors(&image, 0, &config);
        assert!(candidates
            .iter()
            .all(|r| r.method == DetectionMethod::Position));
        assert_eq!(candidates.len(), 5);
    }

    #[test]
    fn test_run_detectors_is_deterministic() {
        let mut image = RgbImage::from_pixel(800, 1000, Rgb([255, 255, 255]));
        for y in 100..160 {
            for x in 100..160 {
                image.put_pixel(x, y, Rgb([200, 30, 40]));
            }
        }
        let config = DetectionConfig::default();
        let first = run_detectors(&image, 0, &config);
        let second = run_detectors(&image, 0, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_multiple_methods_fire_on_a_solid_mark() {
        let mut image = RgbImage::from_pixel(800, 1000, Rgb([255, 255, 255]));
        for y in 200..280 {
            for x in 300..380 {
                image.put_pixel(x, y, Rgb([10, 10, 10]));
            }
        }
        let config = DetectionConfig::default();
        let candidates = run_detectors(&image, 0, &config);

        let methods: std::collections::BTreeSet<DetectionMethod> =
            candidates.iter().map(|r| r.method).collect();
        assert!(methods.contains(&DetectionMethod::Color));
        assert!(methods.contains(&DetectionMethod::Edge));
        assert!(methods.contains(&DetectionMethod::Contour));
        assert!(methods.contains(&DetectionMethod::Position));
    }
}
