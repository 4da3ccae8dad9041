//! Color-band blob detection.
//!
//! Thresholds the raster in HSV space against a fixed palette of broad
//! color bands and emits one candidate per connected foreground blob whose
//! pixel area falls inside the configured band. Red wraps the hue axis, so
//! its two disjoint hue ranges are unioned into one mask before contour
//! extraction.

#![allow(clippy::cast_possible_truncation)]

use super::CandidateDetector;
use crate::raster::mask_blobs;
use image::{GrayImage, Luma, RgbImage};
use serde_json::json;
use vizscout_core::{DetectionConfig, DetectionMethod, Region, Result};

/// One broad color band in HSV space. Hue in degrees, saturation and value
/// in [0, 1]. An empty hue list matches any hue (achromatic bands).
struct ColorBand {
    name: &'static str,
    hue: &'static [(f32, f32)],
    sat: (f32, f32),
    val: (f32, f32),
}

const CHROMATIC_SAT: (f32, f32) = (0.35, 1.0);
const CHROMATIC_VAL: (f32, f32) = (0.20, 1.0);

/// The fixed palette. Red uses two disjoint hue ranges to cover the wrap.
const BANDS: &[ColorBand] = &[
    ColorBand {
        name: "red",
        hue: &[(0.0, 10.0), (330.0, 360.0)],
        sat: CHROMATIC_SAT,
        val: CHROMATIC_VAL,
    },
    ColorBand {
        name: "orange",
        hue: &[(10.0, 40.0)],
        sat: CHROMATIC_SAT,
        val: CHROMATIC_VAL,
    },
    ColorBand {
        name: "yellow",
        hue: &[(40.0, 70.0)],
        sat: CHROMATIC_SAT,
        val: CHROMATIC_VAL,
    },
    ColorBand {
        name: "green",
        hue: &[(70.0, 165.0)],
        sat: CHROMATIC_SAT,
        val: CHROMATIC_VAL,
    },
    ColorBand {
        name: "blue",
        hue: &[(165.0, 255.0)],
        sat: CHROMATIC_SAT,
        val: CHROMATIC_VAL,
    },
    ColorBand {
        name: "purple",
        hue: &[(255.0, 330.0)],
        sat: CHROMATIC_SAT,
        val: CHROMATIC_VAL,
    },
    ColorBand {
        name: "black",
        hue: &[],
        sat: (0.0, 1.0),
        val: (0.0, 0.15),
    },
    ColorBand {
        name: "white",
        hue: &[],
        sat: (0.0, 0.10),
        val: (0.85, 1.0),
    },
    ColorBand {
        name: "gray",
        hue: &[],
        sat: (0.0, 0.12),
        val: (0.15, 0.85),
    },
];

impl ColorBand {
    fn contains(&self, h: f32, s: f32, v: f32) -> bool {
        if s < self.sat.0 || s > self.sat.1 || v < self.val.0 || v > self.val.1 {
            return false;
        }
        self.hue.is_empty() || self.hue.iter().any(|&(lo, hi)| h >= lo && h < hi)
    }
}

/// RGB to HSV. Hue in [0, 360), saturation and value in [0, 1].
#[must_use = "returns the HSV triple"]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f32::EPSILON {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if (max - g).abs() < f32::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h.rem_euclid(360.0), s, max)
}

/// Color-band blob detection strategy.
pub struct ColorDetector;

impl CandidateDetector for ColorDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Color
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

        // One HSV pass assigns each pixel to at most one band; both red hue
        // ranges land in the same band index, giving the unioned red mask.
        let mut band_map = vec![u8::MAX; (width as usize) * (height as usize)];
        let mut band_counts = [0usize; BANDS.len()];
        for (x, y, pixel) in image.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            let (h, s, v) = rgb_to_hsv(r, g, b);
            if let Some(idx) = BANDS.iter().position(|band| band.contains(h, s, v)) {
                band_map[(y as usize) * (width as usize) + (x as usize)] = idx as u8;
                band_counts[idx] += 1;
            }
        }

        let (min_area, max_area) = config.color_area;
        let mut regions = Vec::new();

        for (idx, band) in BANDS.iter().enumerate() {
            if band_counts[idx] == 0 {
                continue;
            }
            let mask = GrayImage::from_fn(width, height, |x, y| {
                if band_map[(y as usize) * (width as usize) + (x as usize)] == idx as u8 {
                    Luma([255])
                } else {
                    Luma([0])
                }
            });

            for blob in mask_blobs(&mask) {
                if blob.pixels < min_area || blob.pixels > max_area {
                    continue;
                }
                regions.push(
                    Region::new(page_index, blob.bbox, DetectionMethod::Color)
                        .with_metadata("color", json!(band.name))
                        .with_metadata("pixel_area", json!(blob.pixels)),
                );
            }
        }

        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rgb_to_hsv_primaries() {
        let (h, s, v) = rgb_to_hsv(255, 0, 0);
        assert!(h < 1.0 || h > 359.0);
        assert!((s - 1.0).abs() < 1e-6);
        assert!((v - 1.0).abs() < 1e-6);

        let (h, _, _) = rgb_to_hsv(0, 255, 0);
        assert!((h - 120.0).abs() < 1.0);

        let (h, _, _) = rgb_to_hsv(0, 0, 255);
        assert!((h - 240.0).abs() < 1.0);

        let (_, s, v) = rgb_to_hsv(255, 255, 255);
        assert_eq!(s, 0.0);
        assert!((v - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_detects_saturated_blob_with_band_name() {
        let mut image = RgbImage::from_pixel(400, 400, Rgb([255, 255, 255]));
        for y in 50..90 {
            for x in 60..120 {
                image.put_pixel(x, y, Rgb([20, 40, 220]));
            }
        }
        let regions = ColorDetector
            .detect(&image, 2, &DetectionConfig::default())
            .unwrap();

        let blue: Vec<_> = regions
            .iter()
            .filter(|r| r.metadata_str("color") == Some("blue"))
            .collect();
        assert_eq!(blue.len(), 1);
        assert_eq!(blue[0].page_index, 2);
        assert_eq!(blue[0].bbox.x0, 60);
        assert_eq!(blue[0].bbox.y0, 50);
        assert_eq!(blue[0].confidence, 0.0);
    }

    #[test]
    fn test_red_hue_wrap_is_one_blob() {
        // Half the mark sits just below the hue wrap, half just above it;
        // both must land in the single red band and form one blob.
        let mut image = RgbImage::from_pixel(300, 300, Rgb([255, 255, 255]));
        for y in 100..140 {
            for x in 100..130 {
                image.put_pixel(x, y, Rgb([230, 25, 35])); // hue ~ 357
            }
            for x in 130..160 {
                image.put_pixel(x, y, Rgb([230, 35, 25])); // hue ~ 3
            }
        }
        let regions = ColorDetector
            .detect(&image, 0, &DetectionConfig::default())
            .unwrap();
        let red: Vec<_> = regions
            .iter()
            .filter(|r| r.metadata_str("color") == Some("red"))
            .collect();
        assert_eq!(red.len(), 1);
        assert_eq!(red[0].bbox.width(), 60);
    }

    #[test]
    fn test_area_band_filters_page_sized_blobs() {
        // The page-sized white blob exceeds the maximum area and a couple
        // of isolated pixels fall below the minimum.
        let mut image = RgbImage::from_pixel(800, 1000, Rgb([255, 255, 255]));
        image.put_pixel(10, 10, Rgb([20, 200, 40]));
        image.put_pixel(700, 900, Rgb([20, 200, 40]));
        let regions = ColorDetector
            .detect(&image, 0, &DetectionConfig::default())
            .unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn test_zero_sized_raster() {
        let image = RgbImage::new(0, 0);
        let regions = ColorDetector
            .detect(&image, 0, &DetectionConfig::default())
            .unwrap();
        assert!(regions.is_empty());
    }
}
