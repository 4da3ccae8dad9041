//! Pure Rust raster helpers shared by the detector strategies.
//!
//! These are small, allocation-conscious implementations of the pixel
//! operations the detectors need: binary masks, foreground blob extraction
//! via contour bounding boxes, and integral-image window statistics for the
//! texture and brightness detectors.

// Pixel coordinates, window statistics and area ratios involve int/float casts
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use vizscout_core::PixelBox;

/// A foreground blob extracted from a binary mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskBlob {
    /// Bounding box of the blob's outer contour
    pub bbox: PixelBox,
    /// Foreground pixel count inside the bounding box
    pub pixels: u64,
}

/// Convert a page raster to grayscale.
#[inline]
#[must_use = "returns the grayscale image"]
pub fn to_gray(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Binary mask of pixels strictly darker than `thresh`.
///
/// Document content is dark on a light ground, so the contour detector
/// treats "below threshold" as foreground (the inverse of a plain binary
/// threshold).
#[must_use = "returns a new mask image"]
pub fn mask_below(gray: &GrayImage, thresh: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut mask = GrayImage::new(width, height);
    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel.0[0] < thresh {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// Pixel-wise union (max) of two same-sized masks.
#[must_use = "returns a new mask image"]
pub fn union_masks(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let (width, height) = a.dimensions();
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let v = a.get_pixel(x, y).0[0].max(b.get_pixel(x, y).0[0]);
            out.put_pixel(x, y, Luma([v]));
        }
    }
    out
}

/// Extract foreground blobs from a binary mask.
///
/// Each outer contour yields one blob with its bounding box and the count
/// of foreground pixels inside that box. Hole contours are skipped so a
/// ring-shaped mark produces a single blob.
#[must_use = "returns the extracted blobs"]
pub fn mask_blobs(mask: &GrayImage) -> Vec<MaskBlob> {
    let contours: Vec<Contour<u32>> = find_contours(mask);
    let mut blobs = Vec::new();

    for contour in &contours {
        if contour.border_type != BorderType::Outer || contour.points.is_empty() {
            continue;
        }
        let mut x0 = u32::MAX;
        let mut y0 = u32::MAX;
        let mut x1 = 0u32;
        let mut y1 = 0u32;
        for p in &contour.points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        let bbox = PixelBox::new(x0, y0, x1 + 1, y1 + 1);
        blobs.push(MaskBlob {
            bbox,
            pixels: count_foreground(mask, &bbox),
        });
    }

    blobs
}

/// Count foreground pixels of a mask inside a bounding box.
#[must_use = "returns the foreground pixel count"]
pub fn count_foreground(mask: &GrayImage, bbox: &PixelBox) -> u64 {
    let (width, height) = mask.dimensions();
    let clamped = bbox.clamp_to(width, height);
    let mut count = 0u64;
    for y in clamped.y0..clamped.y1 {
        for x in clamped.x0..clamped.x1 {
            if mask.get_pixel(x, y).0[0] > 0 {
                count += 1;
            }
        }
    }
    count
}

/// Integral images over luminance: running sums of values and squared
/// values, laid out as `(width + 1) x (height + 1)` so window sums need no
/// boundary branches.
#[derive(Debug)]
pub struct LumaIntegral {
    width: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl LumaIntegral {
    /// Build integral images for a grayscale raster.
    #[must_use = "returns the integral image"]
    pub fn build(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let (w, h) = (w as usize, h as usize);
        let stride = w + 1;
        let mut sum = vec![0.0f64; stride * (h + 1)];
        let mut sum_sq = vec![0.0f64; stride * (h + 1)];

        for y in 0..h {
            let mut row = 0.0f64;
            let mut row_sq = 0.0f64;
            for x in 0..w {
                let v = f64::from(gray.get_pixel(x as u32, y as u32).0[0]);
                row += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + (x + 1);
                sum[idx] = sum[y * stride + (x + 1)] + row;
                sum_sq[idx] = sum_sq[y * stride + (x + 1)] + row_sq;
            }
        }

        Self {
            width: stride,
            sum,
            sum_sq,
        }
    }

    fn window_sums(&self, bbox: &PixelBox) -> (f64, f64, f64) {
        let (x0, y0) = (bbox.x0 as usize, bbox.y0 as usize);
        let (x1, y1) = (bbox.x1 as usize, bbox.y1 as usize);
        let s = self.sum[y1 * self.width + x1] + self.sum[y0 * self.width + x0]
            - self.sum[y0 * self.width + x1]
            - self.sum[y1 * self.width + x0];
        let sq = self.sum_sq[y1 * self.width + x1] + self.sum_sq[y0 * self.width + x0]
            - self.sum_sq[y0 * self.width + x1]
            - self.sum_sq[y1 * self.width + x0];
        let n = ((x1 - x0) * (y1 - y0)) as f64;
        (s, sq, n)
    }

    /// Luminance variance over a window.
    #[must_use = "returns the window variance"]
    pub fn variance(&self, bbox: &PixelBox) -> f64 {
        let (s, sq, n) = self.window_sums(bbox);
        if n == 0.0 {
            return 0.0;
        }
        let mean = s / n;
        (sq / n - mean * mean).max(0.0)
    }

    /// Luminance standard deviation over a window.
    #[inline]
    #[must_use = "returns the window standard deviation"]
    pub fn std_dev(&self, bbox: &PixelBox) -> f64 {
        self.variance(bbox).sqrt()
    }
}

/// One sliding-window sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStat {
    /// Window bounds
    pub bbox: PixelBox,
    /// Statistic value (variance or standard deviation)
    pub value: f64,
}

/// Slide a `window`-sized box over the raster at half-window stride and
/// evaluate `stat` for each position.
#[must_use = "returns the window samples"]
pub fn sliding_windows<F>(width: u32, height: u32, window: u32, stat: F) -> Vec<WindowStat>
where
    F: Fn(&PixelBox) -> f64,
{
    let window = window.max(2);
    let stride = (window / 2).max(1);
    let mut stats = Vec::new();

    if width < window || height < window {
        return stats;
    }

    let mut y = 0;
    while y + window <= height {
        let mut x = 0;
        while x + window <= width {
            let bbox = PixelBox::new(x, y, x + window, y + window);
            stats.push(WindowStat {
                bbox,
                value: stat(&bbox),
            });
            x += stride;
        }
        y += stride;
    }

    stats
}

/// Value at the given percentile (0.0..=1.0) of the samples.
///
/// Returns `None` for an empty sample set. Percentile selection is by
/// sorted rank, which keeps the cut deterministic.
#[must_use = "returns the percentile value"]
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
    Some(sorted[rank.min(sorted.len() - 1)])
}

/// Paint the given windows as foreground into a fresh mask.
#[must_use = "returns a new mask image"]
pub fn windows_to_mask(width: u32, height: u32, windows: &[PixelBox]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for bbox in windows {
        let clamped = bbox.clamp_to(width, height);
        for y in clamped.y0..clamped.y1 {
            for x in clamped.x0..clamped.x1 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with_rect(w: u32, h: u32, rect: PixelBox) -> GrayImage {
        windows_to_mask(w, h, &[rect])
    }

    #[test]
    fn test_mask_blobs_single_rect() {
        let mask = mask_with_rect(100, 100, PixelBox::new(10, 20, 40, 50));
        let blobs = mask_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].bbox, PixelBox::new(10, 20, 40, 50));
        assert_eq!(blobs[0].pixels, 900);
    }

    #[test]
    fn test_mask_blobs_empty_mask() {
        let mask = GrayImage::new(50, 50);
        assert!(mask_blobs(&mask).is_empty());
    }

    #[test]
    fn test_mask_blobs_separate_rects() {
        let mut mask = mask_with_rect(200, 200, PixelBox::new(5, 5, 25, 25));
        let second = PixelBox::new(100, 100, 140, 130);
        for y in second.y0..second.y1 {
            for x in second.x0..second.x1 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let mut blobs = mask_blobs(&mask);
        blobs.sort_by_key(|b| b.bbox.x0);
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[1].bbox, second);
    }

    #[test]
    fn test_union_masks() {
        let a = mask_with_rect(30, 30, PixelBox::new(0, 0, 10, 10));
        let b = mask_with_rect(30, 30, PixelBox::new(5, 5, 20, 20));
        let u = union_masks(&a, &b);
        assert_eq!(u.get_pixel(2, 2).0[0], 255);
        assert_eq!(u.get_pixel(15, 15).0[0], 255);
        assert_eq!(u.get_pixel(25, 25).0[0], 0);
    }

    #[test]
    fn test_integral_variance_flat_vs_checker() {
        let flat = GrayImage::from_pixel(32, 32, Luma([128]));
        let integral = LumaIntegral::build(&flat);
        let window = PixelBox::new(0, 0, 16, 16);
        assert_eq!(integral.variance(&window), 0.0);

        let checker = GrayImage::from_fn(32, 32, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        let integral = LumaIntegral::build(&checker);
        assert!(integral.variance(&window) > 10_000.0);
        assert!(integral.std_dev(&window) > 100.0);
    }

    #[test]
    fn test_sliding_windows_cover_raster() {
        let stats = sliding_windows(64, 32, 16, |_| 1.0);
        assert!(!stats.is_empty());
        for stat in &stats {
            assert!(stat.bbox.x1 <= 64);
            assert!(stat.bbox.y1 <= 32);
            assert_eq!(stat.bbox.width(), 16);
        }
        // Raster smaller than the window yields no samples, not a panic.
        assert!(sliding_windows(8, 8, 16, |_| 1.0).is_empty());
    }

    #[test]
    fn test_percentile_selection() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 1.0), Some(10.0));
        assert_eq!(percentile(&values, 0.5), Some(6.0));
        assert_eq!(percentile(&[], 0.5), None);
    }
}
